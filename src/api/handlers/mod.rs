mod books;
mod loans;
mod members;

pub use books::*;
pub use loans::*;
pub use members::*;

use crate::application::ServiceDependencies;

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}
