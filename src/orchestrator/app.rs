//! 应用入口 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：日志文件、凭证门禁、远端客户端、品牌会话
//! 2. **读取简报**：TOML 简报文件或环境变量
//! 3. **启动生成**：会话分析 + 分批生成，期间订阅快照打印进度
//! 4. **导出看板**：JSON / Markdown / 图片

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::clients::GeminiGenerationClient;
use crate::config::Config;
use crate::infrastructure::{CredentialSlot, EnvCredentialGate, GateOutcome};
use crate::models::{load_brand_brief, BrandInput, SectionDescriptor};
use crate::orchestrator::session::BrandSession;
use crate::services::BoardExporter;
use crate::state::BoardSnapshot;
use crate::utils::image_encoding::encode_image_file;
use crate::utils::logging::{init_log_file, log_startup, print_final_stats};

/// 应用主结构
pub struct App {
    config: Config,
    session: BrandSession,
    exporter: BoardExporter,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate().context("配置校验失败")?;
        init_log_file(&config.output_log_file, &config.brand_name)?;

        log_startup(
            config.section_batch_size,
            &config.llm_model_name,
            &config.image_model_name,
        );

        let initial_key = Some(config.llm_api_key.clone()).filter(|k| !k.trim().is_empty());
        let slot = CredentialSlot::new(initial_key);
        let gate = EnvCredentialGate::new(
            slot.clone(),
            config.credential_file.as_ref().map(PathBuf::from),
        );
        let client = GeminiGenerationClient::new(&config, slot);

        let session = BrandSession::new(Arc::new(client), Arc::new(gate), config.section_batch_size)
            .with_verbose_logging(config.verbose_logging);

        Ok(Self {
            exporter: BoardExporter::new(&config.output_dir),
            config,
            session,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let input = self.load_input().await?;
        let logo = match &input.logo_path {
            Some(path) => Some(
                encode_image_file(path)
                    .await
                    .with_context(|| format!("无法读取 Logo: {}", path.display()))?,
            ),
            None => None,
        };

        let watcher = spawn_progress_watcher(
            self.session.store().subscribe(),
            self.session.catalog().len(),
        );

        let outcome = self.session.start(&input, logo.as_deref()).await;
        watcher.abort();

        let snapshot = self.session.snapshot();
        let report = match outcome.context("看板生成失败")? {
            GateOutcome::Done(report) => Some(report),
            GateOutcome::CredentialReselected => {
                warn!("⚠️ API Key 已重新选择，导出已完成的区块，请重新运行以补全看板");
                None
            }
        };

        if snapshot.profile.is_some() {
            self.exporter
                .export(&snapshot, self.session.catalog())
                .await
                .context("看板导出失败")?;
        }

        let failed = match report {
            Some(report) => report.failed,
            None => pending_sections(&snapshot, self.session.catalog()),
        };
        print_final_stats(
            snapshot.ready_count(),
            &failed,
            self.session.catalog().len(),
            &self.config.output_dir,
        );

        Ok(())
    }

    /// 读取品牌简报：简报文件优先，否则使用环境变量配置
    async fn load_input(&self) -> Result<BrandInput> {
        if let Some(brief) = &self.config.brand_brief_file {
            return load_brand_brief(Path::new(brief)).await;
        }

        let mut input = BrandInput::new(&self.config.brand_name, &self.config.brand_industry);
        if let Some(prototype) = &self.config.brand_prototype {
            input = input.with_prototype(prototype);
        }
        if let Some(logo) = &self.config.logo_path {
            input = input.with_logo_path(logo);
        }
        Ok(input)
    }
}

/// 快照中还没有结果的区块
fn pending_sections(snapshot: &BoardSnapshot, catalog: &[SectionDescriptor]) -> Vec<String> {
    catalog
        .iter()
        .filter(|d| snapshot.section(d.id).is_none())
        .map(|d| d.id.to_string())
        .collect()
}

/// 订阅快照，区块每到一个打印一次进度
fn spawn_progress_watcher(
    mut rx: watch::Receiver<Arc<BoardSnapshot>>,
    total: usize,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut last_ready = 0;
        while rx.changed().await.is_ok() {
            let ready = rx.borrow_and_update().ready_count();
            if ready != last_ready {
                last_ready = ready;
                info!("⏳ Pro 引擎状态: 深度推理中... 已就绪 {}/{}", ready, total);
            }
        }
    })
}
