//! # Brand Board
//!
//! IP 形象品牌看板生成器：根据品牌名称、行业、形象原型（或上传的 Logo），
//! 调用生成式模型产出 18 个设计区块的文字与插画
//!
//! ## 架构设计
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 凭证门禁，远端调用前确认已选定 API Key
//!
//! ### ② 业务能力层（Services / Clients）
//! - `LlmService` - 品牌 DNA 分析、区块技术说明
//! - `ImageService` - 区块插画
//! - `BoardExporter` - 看板导出
//! - `GenerationClient` - 远端生成能力的统一接口
//!
//! ### ③ 流程层（Workflow）
//! - `BootstrapFlow` - 一次品牌 DNA 分析
//! - `SectionFlow` - 一个区块（正文 + 插画）
//!
//! ### ④ 编排层（Orchestration）
//! - `BatchScheduler` - 分批调度，批间串行、批内并发
//! - `BrandSession` - 启动 / 重新分析
//! - `App` - 程序入口
//!
//! 共享状态集中在 `state::BrandProfileStore`。

pub mod clients;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod state;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{GeminiGenerationClient, GenerationClient};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use infrastructure::{CredentialGate, CredentialSlot, GateOutcome};
pub use models::{BrandInput, BrandProfile, SectionDescriptor, SectionResult, SECTION_CATALOG};
pub use orchestrator::{App, BatchScheduler, BrandSession, RunReport, SchedulerState};
pub use state::{BoardSnapshot, BrandProfileStore};
