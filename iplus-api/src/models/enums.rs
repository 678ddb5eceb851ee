use serde::{Deserialize, Serialize};

/// What a reaction points at. Stored as a short varchar and resolved through
/// an explicit per-kind existence lookup instead of a free-form type string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    Inspire,
    ICan,
    INeed,
}

impl std::fmt::Display for SubjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SubjectKind::Inspire => write!(f, "inspire"),
            SubjectKind::ICan => write!(f, "ican"),
            SubjectKind::INeed => write!(f, "ineed"),
        }
    }
}

impl std::str::FromStr for SubjectKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "inspire" => Ok(SubjectKind::Inspire),
            "ican" => Ok(SubjectKind::ICan),
            "ineed" => Ok(SubjectKind::INeed),
            _ => Err(format!("unknown subject kind: {s}")),
        }
    }
}

/// The two listing families. They share one API shape; the kind picks the
/// backing table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListingKind {
    ICan,
    INeed,
}

impl ListingKind {
    pub fn as_subject(self) -> SubjectKind {
        match self {
            ListingKind::ICan => SubjectKind::ICan,
            ListingKind::INeed => SubjectKind::INeed,
        }
    }

    /// Object-store key prefix for listing images.
    pub fn storage_prefix(self) -> &'static str {
        match self {
            ListingKind::ICan => "ican",
            ListingKind::INeed => "ineed",
        }
    }
}

impl std::fmt::Display for ListingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ListingKind::ICan => write!(f, "ican"),
            ListingKind::INeed => write!(f, "ineed"),
        }
    }
}

impl std::str::FromStr for ListingKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ican" => Ok(ListingKind::ICan),
            "ineed" => Ok(ListingKind::INeed),
            _ => Err(format!("unknown listing kind: {s}")),
        }
    }
}

/// Fixed reaction vocabulary. The source accepted any integer here; the
/// accepted set is pinned down so clients cannot invent values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionType {
    Like,
    Love,
    Clap,
    Idea,
}

impl std::fmt::Display for ReactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReactionType::Like => write!(f, "like"),
            ReactionType::Love => write!(f, "love"),
            ReactionType::Clap => write!(f, "clap"),
            ReactionType::Idea => write!(f, "idea"),
        }
    }
}

impl std::str::FromStr for ReactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "like" => Ok(ReactionType::Like),
            "love" => Ok(ReactionType::Love),
            "clap" => Ok(ReactionType::Clap),
            "idea" => Ok(ReactionType::Idea),
            _ => Err(format!("unknown reaction type: {s}")),
        }
    }
}

/// Moderation status shared by inspire posts and listings. New content always
/// starts out `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Pending,
    Active,
    Inactive,
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PostStatus::Pending => write!(f, "pending"),
            PostStatus::Active => write!(f, "active"),
            PostStatus::Inactive => write!(f, "inactive"),
        }
    }
}

impl std::str::FromStr for PostStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(PostStatus::Pending),
            "active" => Ok(PostStatus::Active),
            "inactive" => Ok(PostStatus::Inactive),
            _ => Err(format!("unknown post status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceType {
    Fixed,
    Hourly,
}

impl std::fmt::Display for PriceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriceType::Fixed => write!(f, "fixed"),
            PriceType::Hourly => write!(f, "hourly"),
        }
    }
}

impl std::str::FromStr for PriceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fixed" => Ok(PriceType::Fixed),
            "hourly" => Ok(PriceType::Hourly),
            _ => Err(format!("unknown price type: {s}")),
        }
    }
}

/// Media kind of an inspire post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

impl std::str::FromStr for MediaKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "image" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            _ => Err(format!("unknown media kind: {s}")),
        }
    }
}

/// Listing-request lifecycle: pending is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Accepted,
    Rejected,
}

impl RequestStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestStatus::Pending => write!(f, "pending"),
            RequestStatus::Accepted => write!(f, "accepted"),
            RequestStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "accepted" => Ok(RequestStatus::Accepted),
            "rejected" => Ok(RequestStatus::Rejected),
            _ => Err(format!("unknown request status: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatingStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for RatingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RatingStatus::Pending => write!(f, "pending"),
            RatingStatus::Approved => write!(f, "approved"),
            RatingStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl std::str::FromStr for RatingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(RatingStatus::Pending),
            "approved" => Ok(RatingStatus::Approved),
            "rejected" => Ok(RatingStatus::Rejected),
            _ => Err(format!("unknown rating status: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subject_kind_roundtrip() {
        for kind in [SubjectKind::Inspire, SubjectKind::ICan, SubjectKind::INeed] {
            assert_eq!(kind.to_string().parse::<SubjectKind>().unwrap(), kind);
        }
        assert!("rateable".parse::<SubjectKind>().is_err());
    }

    #[test]
    fn listing_kind_maps_to_subject() {
        assert_eq!(ListingKind::ICan.as_subject(), SubjectKind::ICan);
        assert_eq!(ListingKind::INeed.as_subject(), SubjectKind::INeed);
        assert_eq!(ListingKind::INeed.storage_prefix(), "ineed");
    }

    #[test]
    fn reaction_vocabulary_is_closed() {
        assert_eq!("LIKE".parse::<ReactionType>().unwrap(), ReactionType::Like);
        assert!("7".parse::<ReactionType>().is_err());
        assert!("dislike".parse::<ReactionType>().is_err());
    }

    #[test]
    fn request_status_terminality() {
        assert!(!RequestStatus::Pending.is_terminal());
        assert!(RequestStatus::Accepted.is_terminal());
        assert!(RequestStatus::Rejected.is_terminal());
    }

    #[test]
    fn status_parse_display() {
        assert_eq!("pending".parse::<PostStatus>().unwrap(), PostStatus::Pending);
        assert_eq!(PostStatus::Active.to_string(), "active");
        assert_eq!("hourly".parse::<PriceType>().unwrap(), PriceType::Hourly);
        assert_eq!("video".parse::<MediaKind>().unwrap(), MediaKind::Video);
        assert_eq!("approved".parse::<RatingStatus>().unwrap(), RatingStatus::Approved);
    }
}
