//! 批次调度器 - 编排层
//!
//! ## 职责
//!
//! 把区块目录按固定大小分批，批与批之间严格串行，批内所有区块并发生成，
//! 每个区块一完成就立即通过 `emit` 交出结果。
//!
//! ## 状态机
//!
//! `Idle → RunningGroup(0) → … → RunningGroup(n-1) → Completed`，
//! 远端拒绝凭证时在当前批次结束后进入 `Aborted`。
//! 同一时刻只允许一轮运行。

use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};

use crate::clients::GenerationClient;
use crate::error::{AppResult, BusinessError};
use crate::models::{BrandProfile, SectionDescriptor, SectionResult};
use crate::utils::logging::{log_batch_complete, log_batch_start};
use crate::workflow::{SectionCtx, SectionFlow};

/// 默认每批区块数
pub const DEFAULT_BATCH_SIZE: usize = 3;

/// 调度器状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    /// 正在运行第 i 批（从0开始）
    RunningGroup(usize),
    Completed,
    Aborted,
}

impl SchedulerState {
    pub fn is_running(self) -> bool {
        matches!(self, SchedulerState::RunningGroup(_))
    }
}

/// 一轮运行的统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunReport {
    /// 已执行完的批次数
    pub groups_run: usize,
    /// 按完成顺序记录的已写出区块
    pub emitted: Vec<String>,
    /// 本轮失败的区块
    pub failed: Vec<String>,
}

/// 把目录切成连续的固定大小分组，最后一组可以不满
pub fn partition(catalog: &[SectionDescriptor], batch_size: usize) -> Vec<&[SectionDescriptor]> {
    catalog.chunks(batch_size.max(1)).collect()
}

/// 批次调度器
pub struct BatchScheduler<C: GenerationClient + ?Sized> {
    client: Arc<C>,
    batch_size: usize,
    verbose_logging: bool,
    state: Mutex<SchedulerState>,
}

impl<C: GenerationClient + ?Sized> BatchScheduler<C> {
    pub fn new(client: Arc<C>, batch_size: usize) -> Self {
        Self {
            client,
            batch_size: batch_size.max(1),
            verbose_logging: false,
            state: Mutex::new(SchedulerState::Idle),
        }
    }

    pub fn with_verbose_logging(mut self, verbose: bool) -> Self {
        self.verbose_logging = verbose;
        self
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, next: SchedulerState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = next;
    }

    /// 进入运行状态；已有一轮在运行时拒绝
    fn begin(&self) -> AppResult<RunGuard<'_>> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.is_running() {
            return Err(BusinessError::GenerationInProgress.into());
        }
        *state = SchedulerState::RunningGroup(0);
        Ok(RunGuard { state: &self.state })
    }

    /// 运行一轮区块生成
    ///
    /// # 参数
    /// - `catalog`: 有序的区块目录
    /// - `profile`: 当前品牌档案
    /// - `emit`: 每个区块完成时立即调用
    ///
    /// # 返回
    /// 返回本轮统计；远端拒绝凭证时在当前批次结束后返回该错误
    pub async fn run<F>(
        &self,
        catalog: &[SectionDescriptor],
        profile: &BrandProfile,
        mut emit: F,
    ) -> AppResult<RunReport>
    where
        F: FnMut(&str, SectionResult),
    {
        let _guard = self.begin()?;

        let groups = partition(catalog, self.batch_size);
        let total_batches = groups.len();
        let flow = SectionFlow::new(self.client.as_ref(), self.verbose_logging);
        let mut report = RunReport::default();

        for (group_index, group) in groups.into_iter().enumerate() {
            self.set_state(SchedulerState::RunningGroup(group_index));

            let ids: Vec<&str> = group.iter().map(|s| s.id).collect();
            log_batch_start(group_index + 1, total_batches, &ids);

            let offset = group_index * self.batch_size;
            let flow = &flow;
            let mut pending: FuturesUnordered<_> = group
                .iter()
                .enumerate()
                .map(|(i, descriptor)| {
                    let ctx = SectionCtx::new(group_index + 1, offset + i, *descriptor);
                    async move {
                        let result = flow.run(&ctx, profile).await;
                        (ctx, result)
                    }
                })
                .collect();

            let mut group_success = 0;
            let mut rejection = None;

            // 先完成的区块先写出
            while let Some((ctx, result)) = pending.next().await {
                match result {
                    Ok(section) => {
                        info!("{} ✓ 区块生成完成", ctx);
                        emit(ctx.id(), section);
                        report.emitted.push(ctx.id().to_string());
                        group_success += 1;
                    }
                    Err(e) => {
                        warn!("{} ❌ 区块生成失败，保持待生成状态: {}", ctx, e);
                        report.failed.push(ctx.id().to_string());
                        if e.is_credential_rejection() && rejection.is_none() {
                            rejection = Some(e);
                        }
                    }
                }
            }

            report.groups_run += 1;
            log_batch_complete(group_index + 1, group_success, group.len());

            if let Some(e) = rejection {
                warn!("⚠️ 远端拒绝凭证，停止后续批次");
                self.set_state(SchedulerState::Aborted);
                return Err(e);
            }
        }

        self.set_state(SchedulerState::Completed);
        Ok(report)
    }
}

/// 运行未正常结束（future 被丢弃等）时把状态置为 `Aborted`
struct RunGuard<'a> {
    state: &'a Mutex<SchedulerState>,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.is_running() {
            *state = SchedulerState::Aborted;
        }
    }
}
