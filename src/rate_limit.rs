//! ゲスト利用回数の制限
//!
//! 識別子（IPなど）ごとの1日あたり固定カウンタ。
//! サーバーには `UsageLimiter` として注入し、解析ロジックからは参照しない。

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

/// 利用可否の判定結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsageCheck {
    pub allowed: bool,
    /// 残り回数（None は無制限）
    pub remaining: Option<u32>,
}

/// 識別子ごとの利用回数を管理する
pub trait UsageLimiter: Send + Sync {
    /// 1回分を確保する。判定とカウントは不可分に行う
    fn try_acquire(&self, identity: &str) -> UsageCheck;
}

/// 制限なし
#[derive(Debug, Default, Clone, Copy)]
pub struct Unlimited;

impl UsageLimiter for Unlimited {
    fn try_acquire(&self, _identity: &str) -> UsageCheck {
        UsageCheck {
            allowed: true,
            remaining: None,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct UsageWindow {
    count: u32,
    reset_at: DateTime<Utc>,
}

#[derive(Debug)]
struct UsageTable {
    windows: HashMap<String, UsageWindow>,
    next_sweep: DateTime<Utc>,
}

/// 識別子ごとに `limit` 回/日まで（期間は最初の利用から24時間）
#[derive(Debug)]
pub struct DailyUsageLimiter {
    limit: u32,
    period: Duration,
    sweep_interval: Duration,
    usage: Mutex<UsageTable>,
}

impl DailyUsageLimiter {
    pub fn new(limit: u32) -> Self {
        Self {
            limit,
            period: Duration::days(1),
            sweep_interval: Duration::hours(1),
            usage: Mutex::new(UsageTable {
                windows: HashMap::new(),
                next_sweep: DateTime::<Utc>::MIN_UTC,
            }),
        }
    }

    pub fn try_acquire_at(&self, identity: &str, now: DateTime<Utc>) -> UsageCheck {
        let mut usage = self.usage.lock().unwrap_or_else(|e| e.into_inner());

        // 期限切れの識別子を定期的に捨てる（X-Forwarded-For は任意の値を送れる）
        if now >= usage.next_sweep {
            usage.windows.retain(|_, window| window.reset_at >= now);
            usage.next_sweep = now + self.sweep_interval;
        }

        let window = usage
            .windows
            .entry(identity.to_string())
            .or_insert(UsageWindow {
                count: 0,
                reset_at: now + self.period,
            });
        if now > window.reset_at {
            window.count = 0;
            window.reset_at = now + self.period;
        }

        if window.count >= self.limit {
            return UsageCheck {
                allowed: false,
                remaining: Some(0),
            };
        }
        window.count += 1;
        UsageCheck {
            allowed: true,
            remaining: Some(self.limit - window.count),
        }
    }
}

impl UsageLimiter for DailyUsageLimiter {
    fn try_acquire(&self, identity: &str) -> UsageCheck {
        self.try_acquire_at(identity, Utc::now())
    }
}
