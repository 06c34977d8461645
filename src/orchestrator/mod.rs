//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批次调度和会话流程，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用入口
//! - 管理应用生命周期（初始化、运行、导出）
//! - 读取品牌简报和 Logo
//! - 订阅快照输出进度
//!
//! ### `session` - 品牌会话
//! - 凭证门禁 → 品牌 DNA 分析 → 分批生成
//! - 重新上传 Logo 时只刷新品牌 DNA
//! - 会话级单飞
//!
//! ### `batch_scheduler` - 批次调度器
//! - 目录分批，批间串行、批内并发
//! - 区块完成即写出
//!
//! ## 层次关系
//!
//! ```text
//! app
//!     ↓
//! session (启动 / 重新分析)
//!     ↓
//! batch_scheduler (处理 Vec<SectionDescriptor>)
//!     ↓
//! workflow::SectionFlow / BootstrapFlow (处理单个区块 / 单次分析)
//!     ↓
//! clients::GenerationClient → services (能力层：llm / image / export)
//!     ↓
//! infrastructure (基础设施：CredentialGate)
//! ```

pub mod app;
pub mod batch_scheduler;
pub mod session;

// 重新导出主要类型
pub use app::App;
pub use batch_scheduler::{partition, BatchScheduler, RunReport, SchedulerState};
pub use session::BrandSession;
