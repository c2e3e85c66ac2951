//! ding core library: the inbound/destination index behind the `ding` front-ends.
//!
//! `ding-core` lists an inbound folder of scanned documents, keeps text
//! previews of them and file listings of the destination directories in
//! memory, and moves documents into a destination under a new name. It has
//! no UI of its own; the `ding` binary and any other front-end drive it
//! through [`DocIndex`].
//!
//! # Modules
//!
//! - [`index`]: [`DocIndex`], the facade wiring caches, warmup and moves together.
//! - [`cache`]: [`PreviewCache`] and [`DirectoryFileCache`], bundled as [`CacheStore`].
//! - [`warmup`]: Bounded background population of the caches.
//! - [`mover`]: The sentinel-checked copy-then-delete move.
//! - [`fs`]: [`DirectoryEntry`], the [`FilesystemGateway`] seam and listing helpers.
//! - [`naming`]: Extension reconciliation, timestamp prefixes, name suggestions.
//! - [`extract`]: Preview text extraction via `pdftotext`.
//! - [`ocr`]: OCR of inbound files via `ocrmypdf`, single or batched.
//! - [`external`]: Dependency probing and the external viewer.
//! - [`config`]: TOML configuration.
//! - [`error`]: Unified error type ([`CoreError`]) and result alias ([`CoreResult`]).

pub mod cache;
pub mod config;
pub mod error;
pub mod external;
pub mod extract;
pub mod fs;
pub mod index;
pub mod mover;
pub mod naming;
pub mod ocr;
pub mod warmup;

pub use cache::{CacheStore, DirectoryFileCache, PreviewCache};
pub use config::settings::Config;
pub use error::{CoreError, CoreResult};
pub use external::{check_dependencies, open_external, Dependency, DependencyReport};
pub use extract::{PdfToText, TextExtractor};
pub use fs::{DirectoryEntry, FilesystemGateway, LocalFs};
pub use index::{DocIndex, Listing};
pub use mover::{MoveEngine, MoveOutcome};
pub use naming::{strip_timestamp_prefix, timestamp_prefix, timestamp_prefix_now};
pub use ocr::{run_ocr_batch, OcrMyPdf, OcrProcessor, OcrProgress, OcrSummary};
pub use warmup::{WarmupBatch, WarmupScheduler};
