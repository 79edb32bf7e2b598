// ==========================================
// CRM 线索导入 - 会话/认证协作方
// ==========================================
// 职责: 外部会话接口（当前用户 / 清除会话）
// 红线: 导入核心只读取 current_user 用于标记导入人，不管理登录态
// ==========================================

use crate::domain::lead::User;
use std::sync::RwLock;
use tracing::info;

/// 会话协作方接口
pub trait SessionProvider: Send + Sync {
    /// 当前登录用户（未登录返回 None）
    fn current_user(&self) -> Option<User>;

    /// 清除会话（登出）
    fn clear_session(&self);
}

// ==========================================
// InMemorySessionProvider
// ==========================================
// 用途: 桌面壳/测试中的进程内会话
#[derive(Debug, Default)]
pub struct InMemorySessionProvider {
    user: RwLock<Option<User>>,
}

impl InMemorySessionProvider {
    pub fn new(user: Option<User>) -> Self {
        Self {
            user: RwLock::new(user),
        }
    }

    pub fn sign_in(&self, user: User) {
        info!(user_id = %user.id, "用户已登录");
        // 锁中毒时沿用内部数据
        *self.user.write().unwrap_or_else(|e| e.into_inner()) = Some(user);
    }
}

impl SessionProvider for InMemorySessionProvider {
    fn current_user(&self) -> Option<User> {
        self.user.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    fn clear_session(&self) {
        let previous = self.user.write().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(user) = previous {
            info!(user_id = %user.id, "会话已清除");
        }
    }
}
