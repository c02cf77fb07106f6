mod article;
mod errors;
mod live_updates;
mod payload;
mod post;
mod section;

pub use article::{ArticleDraft, ArticleForm};
pub use errors::FieldErrors;
pub use live_updates::{Direction, LiveEntry, LiveSubmission, LiveUpdateList, UpdateDraft};
pub use payload::{csv, split_list, FormPayload, FormValue};
pub use post::{PostDraft, PostForm};
pub use section::{slugify, SectionForm};
