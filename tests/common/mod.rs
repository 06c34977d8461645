//! 集成测试共用的脚本化远端客户端和凭证门禁
#![allow(dead_code)]

use async_trait::async_trait;
use brand_board::error::{AppError, AppResult, CredentialError};
use brand_board::models::{BrandAnalysis, BrandProfile, SectionDescriptor};
use brand_board::CredentialGate;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// 调用事件：`text:标题` / `image:标题`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Start(String),
    End(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzeCall {
    pub name: String,
    pub industry: String,
    pub prototype: Option<String>,
    pub logo: Option<String>,
}

/// 按脚本返回结果的远端客户端，记录每次调用的开始和结束
pub struct ScriptedClient {
    suggested_prototype: Option<String>,
    fail_analysis: bool,
    failing_text: HashSet<String>,
    failing_image: HashSet<String>,
    rejecting_text: HashSet<String>,
    delays: HashMap<String, u64>,
    default_delay_ms: u64,
    pub events: Mutex<Vec<Event>>,
    pub analyze_calls: Mutex<Vec<AnalyzeCall>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedClient {
    pub fn new(suggested_prototype: Option<&str>) -> Self {
        Self {
            suggested_prototype: suggested_prototype.map(str::to_string),
            fail_analysis: false,
            failing_text: HashSet::new(),
            failing_image: HashSet::new(),
            rejecting_text: HashSet::new(),
            delays: HashMap::new(),
            default_delay_ms: 5,
            events: Mutex::new(Vec::new()),
            analyze_calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn fail_analysis(mut self) -> Self {
        self.fail_analysis = true;
        self
    }

    pub fn fail_text(mut self, title: &str) -> Self {
        self.failing_text.insert(title.to_string());
        self
    }

    pub fn fail_image(mut self, title: &str) -> Self {
        self.failing_image.insert(title.to_string());
        self
    }

    pub fn reject_text(mut self, title: &str) -> Self {
        self.rejecting_text.insert(title.to_string());
        self
    }

    pub fn delay(mut self, title: &str, ms: u64) -> Self {
        self.delays.insert(title.to_string(), ms);
        self
    }

    pub fn default_delay(mut self, ms: u64) -> Self {
        self.default_delay_ms = ms;
        self
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn analyze_calls(&self) -> Vec<AnalyzeCall> {
        self.analyze_calls.lock().unwrap().clone()
    }

    /// 某个标题的正文调用次数
    pub fn text_calls(&self, title: &str) -> usize {
        let key = format!("text:{}", title);
        self.events()
            .iter()
            .filter(|e| **e == Event::Start(key.clone()))
            .count()
    }

    pub fn total_text_calls(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, Event::Start(k) if k.starts_with("text:")))
            .count()
    }

    async fn track<T>(&self, key: String, title: &str, result: AppResult<T>) -> AppResult<T> {
        self.events.lock().unwrap().push(Event::Start(key.clone()));
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays.get(title).copied().unwrap_or(self.default_delay_ms);
        tokio::time::sleep(Duration::from_millis(delay)).await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        self.events.lock().unwrap().push(Event::End(key));
        result
    }
}

#[async_trait]
impl brand_board::GenerationClient for ScriptedClient {
    async fn analyze_brand(
        &self,
        name: &str,
        industry: &str,
        prototype: Option<&str>,
        logo_encoding: Option<&str>,
    ) -> AppResult<BrandAnalysis> {
        self.analyze_calls.lock().unwrap().push(AnalyzeCall {
            name: name.to_string(),
            industry: industry.to_string(),
            prototype: prototype.map(str::to_string),
            logo: logo_encoding.map(str::to_string),
        });

        if self.fail_analysis {
            return Err(AppError::Other("analysis unavailable".to_string()));
        }

        Ok(BrandAnalysis {
            colors: vec!["#2E5E4E".to_string(), "#F2C14E".to_string(), "#FAF7F0".to_string()],
            keywords: vec!["温暖".to_string(), "自然".to_string(), "治愈".to_string()],
            target_audience: "一二线城市年轻白领".to_string(),
            core_values: "一杯好茶，点亮日常".to_string(),
            suggested_prototype: self.suggested_prototype.clone(),
        })
    }

    async fn generate_section_text(
        &self,
        section_title: &str,
        profile: &BrandProfile,
    ) -> AppResult<String> {
        let result = if self.rejecting_text.contains(section_title) {
            Err(AppError::Credential(CredentialError::Rejected {
                message: "Requested entity was not found.".to_string(),
            }))
        } else if self.failing_text.contains(section_title) {
            Err(AppError::Other(format!("text failed: {}", section_title)))
        } else {
            Ok(format!("{} 的 {} 技术说明", profile.prototype, section_title))
        };
        self.track(format!("text:{}", section_title), section_title, result)
            .await
    }

    async fn generate_section_image(
        &self,
        subject_prompt: &str,
        _prototype: &str,
        _brand_name: &str,
    ) -> AppResult<String> {
        let title = subject_prompt
            .strip_prefix("专业角色设计：")
            .unwrap_or(subject_prompt)
            .to_string();
        let result = if self.failing_image.contains(&title) {
            Err(AppError::Other(format!("image failed: {}", title)))
        } else {
            Ok(format!("data:image/png;base64,IMG-{}", title))
        };
        self.track(format!("image:{}", title), &title, result).await
    }
}

/// 记录凭证选择次数的门禁
pub struct CountingGate {
    has_key: bool,
    pub requests: AtomicUsize,
}

impl CountingGate {
    pub fn new(has_key: bool) -> Self {
        Self {
            has_key,
            requests: AtomicUsize::new(0),
        }
    }

    pub fn requests(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialGate for CountingGate {
    async fn has_credential(&self) -> bool {
        self.has_key
    }

    async fn request_credential(&self) -> AppResult<()> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// 五个区块 A..E
pub fn five_sections() -> Vec<SectionDescriptor> {
    vec![
        SectionDescriptor::new("a", "A", "甲"),
        SectionDescriptor::new("b", "B", "乙"),
        SectionDescriptor::new("c", "C", "丙"),
        SectionDescriptor::new("d", "D", "丁"),
        SectionDescriptor::new("e", "E", "戊"),
    ]
}

pub fn sample_profile() -> BrandProfile {
    BrandProfile {
        name: "沐阳".to_string(),
        industry: "茶饮行业".to_string(),
        prototype: "柴犬".to_string(),
        logo_reference: "https://picsum.photos/seed/沐阳/400/400".to_string(),
        colors: vec!["#2E5E4E".to_string()],
        keywords: vec!["温暖".to_string()],
        target_audience: "年轻白领".to_string(),
        core_values: "自然".to_string(),
    }
}

/// 事件序列中某个 key 的位置
pub fn position_of(events: &[Event], event: &Event) -> usize {
    events
        .iter()
        .position(|e| e == event)
        .unwrap_or_else(|| panic!("事件不存在: {:?}", event))
}
