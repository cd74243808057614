//! # Admissions Assist
//!
//! A small backend that helps admissions staff pre-fill an application form
//! from a student's documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌────────────┐   ┌──────────┐   ┌────────────┐
//! │ Collector  │──▶│   Prompt   │──▶│   LLM    │──▶│  Assembler │
//! │ PDF/DOCX/  │   │  builder   │   │  client  │   │ fields +   │
//! │ TXT        │   │            │   │          │   │ file report│
//! └────────────┘   └────────────┘   └──────────┘   └────────────┘
//!                                        ▲
//!                        rewrite ────────┘
//! ```
//!
//! ## Data Flow
//!
//! 1. The **collector** ([`collector`]) reads every PDF, DOCX and TXT file in one
//!    folder through the per-format **extractors** ([`extract`]) and joins their
//!    text behind `===== FILE: <name> =====` delimiters.
//! 2. The **prompt builder** ([`prompt`]) truncates that text and wraps it in a
//!    fixed-schema extraction instruction.
//! 3. The **LLM client** ([`llm`]) makes one chat-completion call.
//! 4. The **assembler** ([`assist`]) projects the returned JSON onto the form
//!    fields and attaches the per-file report and timing.
//! 5. The **HTTP layer** ([`server`]) exposes the pipeline and the
//!    **rewrite service** ([`rewrite`]).
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration and credential lookup |
//! | [`models`] | File reports, collected text, response shapes |
//! | [`extract`] | PDF, DOCX and TXT text extraction |
//! | [`collector`] | Folder scan and aggregation |
//! | [`prompt`] | Extraction and rewrite prompts, form field list |
//! | [`llm`] | `CompletionClient` trait and OpenAI-compatible client |
//! | [`assist`] | Folder pipeline and form-data assembly |
//! | [`rewrite`] | Free-text rewrite service |
//! | [`error`] | Error taxonomy |
//! | [`server`] | axum HTTP server |

pub mod assist;
pub mod collector;
pub mod config;
pub mod error;
pub mod extract;
pub mod llm;
pub mod models;
pub mod prompt;
pub mod rewrite;
pub mod server;
