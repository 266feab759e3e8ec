//! # ビューレンダリング
//!
//! tera によるページテンプレートの描画を提供する。
//! テンプレートはバイナリに埋め込み、デプロイ時のファイル配置を不要にする。

use std::sync::LazyLock;

use tera::{Context, Tera};

/// ページレンダラー
///
/// 全テンプレートを登録済みの tera エンジンを保持する。
/// [`renderer()`] 経由でプロセス全体の共有インスタンスを取得する。
pub struct PageRenderer {
    engine: Tera,
}

impl PageRenderer {
    fn build() -> Result<Self, tera::Error> {
        let mut engine = Tera::default();
        engine.add_raw_templates(vec![
            ("index.html", include_str!("../templates/index.html")),
            ("login.html", include_str!("../templates/login.html")),
            ("signup.html", include_str!("../templates/signup.html")),
            ("home.html", include_str!("../templates/home.html")),
            ("profile.html", include_str!("../templates/profile.html")),
            ("error.html", include_str!("../templates/error.html")),
        ])?;

        Ok(Self { engine })
    }

    /// テンプレートを描画する
    pub fn render(&self, template: &str, context: &Context) -> Result<String, tera::Error> {
        self.engine.render(template, context)
    }
}

/// プロセス全体で共有するレンダラーを取得する
///
/// テンプレートは `include_str!` で埋め込まれているため、
/// 登録失敗はビルド成果物の破損を意味する（起動時に即座に落とす）。
pub fn renderer() -> &'static PageRenderer {
    static RENDERER: LazyLock<PageRenderer> = LazyLock::new(|| {
        PageRenderer::build().expect("テンプレートの登録に失敗しました")
    });

    &RENDERER
}
