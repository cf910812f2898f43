pub mod job;
pub mod profile;
pub mod resume;

pub use job::{JobListing, SearchParams, SearchResult, Source};
pub use profile::UserProfile;
pub use resume::{EducationEntry, ExperienceEntry, ProjectEntry, ResumeData};
