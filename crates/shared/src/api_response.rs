//! # API レスポンスエンベロープ
//!
//! JSON を返すエンドポイントの統一レスポンス形式 `{ "data": T }` を提供する。

use serde::{Deserialize, Serialize};

/// JSON エンドポイントの統一レスポンス型
///
/// JSON を返すすべてのエンドポイントは `{ "data": T }` 形式でレスポンスを返す。
/// この型は以下の場所で使用される:
/// - web ハンドラ（Serialize でクライアントにレスポンスを返す）
/// - テストコード（Deserialize でレスポンスを検証する）
///
/// ## 使用例
///
/// ```
/// use monban_shared::ApiResponse;
///
/// let response = ApiResponse::new("hello");
/// assert_eq!(response.data, "hello");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    /// 新しい `ApiResponse` を作成する
    pub fn new(data: T) -> Self {
        Self { data }
    }
}
