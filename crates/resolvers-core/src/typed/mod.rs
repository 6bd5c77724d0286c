//! Typed - 型付き resolver API
//!
//! resolver の引数型を登録時に静的に決め、dispatch 時は型消去された
//! `DynResolver` を呼ぶだけにします。
//!
//! # 二層構造
//! - **表層（Typed）**: `Fn(A) -> O`, `Fn(A, I) -> O` - 型安全
//! - **内部（Dyn）**: `DynResolver` trait - object-safe, type erasure

pub mod handler;
pub mod output;
pub mod registry;

// 主要な trait/型 を再エクスポート
pub use self::handler::{Arity, Descriptor, DynResolver, IntoResolver};
pub use self::output::{HandlerOutput, Partial};
pub use self::registry::Registry;
