//! 区块生成上下文
//!
//! 封装"我正在生成第几批的哪个区块"这一信息

use std::fmt::Display;

use crate::models::SectionDescriptor;

/// 区块生成上下文
#[derive(Debug, Clone)]
pub struct SectionCtx {
    /// 批次编号（从1开始，仅用于日志显示）
    pub batch_index: usize,

    /// 区块在目录中的位置（从0开始）
    pub position: usize,

    pub descriptor: SectionDescriptor,
}

impl SectionCtx {
    pub fn new(batch_index: usize, position: usize, descriptor: SectionDescriptor) -> Self {
        Self {
            batch_index,
            position,
            descriptor,
        }
    }

    pub fn id(&self) -> &'static str {
        self.descriptor.id
    }
}

impl Display for SectionCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[批次 {} 区块 {}#{}]",
            self.batch_index, self.descriptor.id, self.descriptor.title
        )
    }
}
