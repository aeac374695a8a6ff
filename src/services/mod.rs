//! External collaborators: tracker API, local git, LLM, prompting,
//! credential storage.

pub mod ai;
pub mod credentials;
pub mod git;
pub mod gitlab_client;
pub mod prompt;
pub mod tracker;

pub use ai::{Completion, OpenAiClient, ResponseFormat};
pub use credentials::CredentialService;
pub use git::{GitCli, Vcs};
pub use gitlab_client::{GitLabClient, GitLabClientConfig};
pub use prompt::{Prompter, TerminalPrompter};
pub use tracker::Tracker;
