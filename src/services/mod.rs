pub mod blank_page;
pub mod command;
pub mod intake;
pub mod merger;
pub mod normalizer;
pub mod pipeline;
pub mod workspace;

pub use blank_page::BlankPageSynthesizer;
pub use command::{CommandOutput, CommandRunner, SystemCommandRunner};
pub use intake::UploadIntake;
pub use merger::MergeOrchestrator;
pub use normalizer::FormatNormalizer;
pub use pipeline::{MergeOutcome, MergePipeline};
pub use workspace::Workspace;
