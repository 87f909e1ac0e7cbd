/// 只能触发一次的取消闩锁
///
/// 同一个处理器实例里，无论有多少个失败来源，取消回调最多调用一次。
#[derive(Debug, Default)]
pub struct CancellationGuard {
    fired: bool,
}

impl CancellationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// 第一次调用返回 true，之后都返回 false
    pub fn trigger(&mut self) -> bool {
        !std::mem::replace(&mut self.fired, true)
    }
}
