// ==========================================
// 图书目录批量导入系统 - 进度/错误报告器
// ==========================================
// 职责: 面向界面/CLI 的有序审计行输出
// 模型: 单生产者(导入工作者)/单消费者(展示层)消息通道
// 约束: 消息顺序与引擎产出顺序一致；一行的消息整体先于下一行
// ==========================================

use crate::domain::types::Severity;
use std::sync::Mutex;
use tokio::sync::mpsc;

// ==========================================
// ReportLine - 一条审计行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportLine {
    /// None 表示不带级别标记的纯文本行（分隔线、缩进明细等）
    pub severity: Option<Severity>,
    pub text: String,
}

impl ReportLine {
    /// 展示格式: 带级别时加 `[TAG] ` 前缀
    pub fn render(&self) -> String {
        match self.severity {
            Some(sev) => format!("[{}] {}", sev.tag(), self.text),
            None => self.text.clone(),
        }
    }
}

// ==========================================
// ImportReporter Trait
// ==========================================
// 实现者: ChannelReporter（跨线程投递）, BufferReporter（内存收集）
pub trait ImportReporter: Send + Sync {
    /// 追加一条纯文本行
    fn append_line(&self, text: &str);

    /// 追加一条带级别标记的行
    fn append_tagged_line(&self, severity: Severity, text: &str);
}

// ==========================================
// ChannelReporter - 通道报告器
// ==========================================
// 用途: 导入工作者在后台线程运行时，把审计行异步投递到展示侧。
// 无界通道保证 append 永不阻塞工作者；接收端按投递顺序消费。
pub struct ChannelReporter {
    tx: mpsc::UnboundedSender<ReportLine>,
}

impl ChannelReporter {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ReportLine>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl ImportReporter for ChannelReporter {
    fn append_line(&self, text: &str) {
        // 接收端先退出时丢弃消息即可，不影响导入本身
        let _ = self.tx.send(ReportLine {
            severity: None,
            text: text.to_string(),
        });
    }

    fn append_tagged_line(&self, severity: Severity, text: &str) {
        let _ = self.tx.send(ReportLine {
            severity: Some(severity),
            text: text.to_string(),
        });
    }
}

// ==========================================
// BufferReporter - 内存报告器
// ==========================================
// 用途: 嵌入式调用与测试断言
#[derive(Default)]
pub struct BufferReporter {
    lines: Mutex<Vec<ReportLine>>,
}

impl BufferReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 取出当前全部审计行的快照
    pub fn lines(&self) -> Vec<ReportLine> {
        self.lines.lock().expect("reporter lock poisoned").clone()
    }
}

impl ImportReporter for BufferReporter {
    fn append_line(&self, text: &str) {
        self.lines
            .lock()
            .expect("reporter lock poisoned")
            .push(ReportLine {
                severity: None,
                text: text.to_string(),
            });
    }

    fn append_tagged_line(&self, severity: Severity, text: &str) {
        self.lines
            .lock()
            .expect("reporter lock poisoned")
            .push(ReportLine {
                severity: Some(severity),
                text: text.to_string(),
            });
    }
}
