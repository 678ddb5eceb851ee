use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::schema::{skill_categories, skill_sub_categories, skills};

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = skill_categories)]
pub struct SkillCategory {
    pub id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = skill_categories)]
pub struct NewSkillCategory {
    pub name: String,
}

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = skill_sub_categories)]
pub struct SkillSubCategory {
    pub id: Uuid,
    pub category_id: Uuid,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = skill_sub_categories)]
pub struct NewSkillSubCategory {
    pub category_id: Uuid,
    pub name: String,
}

#[derive(Debug, Queryable, Identifiable, Serialize, Clone)]
#[diesel(table_name = skills)]
pub struct Skill {
    pub id: Uuid,
    pub name: String,
    pub category_id: Uuid,
    pub sub_category_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = skills)]
pub struct NewSkill {
    pub name: String,
    pub category_id: Uuid,
    pub sub_category_id: Option<Uuid>,
}

#[derive(Debug, AsChangeset, Default)]
#[diesel(table_name = skills)]
pub struct UpdateSkill {
    pub name: Option<String>,
    pub category_id: Option<Uuid>,
    pub sub_category_id: Option<Option<Uuid>>,
}
