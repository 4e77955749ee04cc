//! SeaORM entity models
//!
//! Database entities for the Perdia content engine

mod article;
mod content_idea;
mod contributor;
mod generation_job;
mod monetization_program;

pub use content_idea::{
    Entity as ContentIdeaEntity,
    Model as ContentIdea,
    ActiveModel as ContentIdeaActiveModel,
    Column as ContentIdeaColumn,
    IdeaStatus,
};

pub use article::{
    Entity as ArticleEntity,
    Model as Article,
    ActiveModel as ArticleActiveModel,
    Column as ArticleColumn,
    ArticleStatus,
};

pub use contributor::{
    Entity as ContributorEntity,
    Model as Contributor,
    ActiveModel as ContributorActiveModel,
    Column as ContributorColumn,
};

pub use generation_job::{
    Entity as GenerationJobEntity,
    Model as GenerationJob,
    ActiveModel as GenerationJobActiveModel,
    Column as GenerationJobColumn,
    JobOptions,
    JobStatus,
};

pub use monetization_program::{
    Entity as MonetizationProgramEntity,
    Model as MonetizationProgram,
    ActiveModel as MonetizationProgramActiveModel,
    Column as MonetizationProgramColumn,
};
