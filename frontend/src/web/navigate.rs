//! 导航接口
//!
//! API 客户端与 store 只依赖此接口跳转页面，生产环境由 `RouterService` 实现。

pub trait Navigate: Send + Sync {
    /// 导航到指定路径（可带查询串）
    fn navigate(&self, path: &str);

    /// 当前路径（不含查询串）
    fn current_path(&self) -> String;
}

/// 记录所有跳转的导航实现（测试用）
#[cfg(test)]
pub struct RecordingNavigator {
    pub path: std::sync::Mutex<String>,
    pub visited: std::sync::Mutex<Vec<String>>,
}

#[cfg(test)]
impl RecordingNavigator {
    pub fn at(path: &str) -> Self {
        Self {
            path: std::sync::Mutex::new(path.to_string()),
            visited: std::sync::Mutex::new(Vec::new()),
        }
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Navigate for RecordingNavigator {
    fn navigate(&self, path: &str) {
        self.visited.lock().unwrap().push(path.to_string());
        let bare = path.split('?').next().unwrap_or(path);
        *self.path.lock().unwrap() = bare.to_string();
    }

    fn current_path(&self) -> String {
        self.path.lock().unwrap().clone()
    }
}
