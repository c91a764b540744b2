//! 前端单页应用
//!
//! 构建产物由 rust-embed 嵌入二进制；`frontend-custom/` 下的同名文件优先（开发时免重新编译）。
//! 无扩展名的路径视为前端路由，统一返回 `index.html`。

use actix_web::http::header::{CACHE_CONTROL, ContentType};
use actix_web::{HttpRequest, HttpResponse, Result as ActixResult, web};
use rust_embed::Embed;
use std::borrow::Cow;
use std::path::{Component, Path};

use crate::config::AppConfig;

#[derive(Embed)]
#[folder = "frontend/dist/"]
struct FrontendAssets;

const INDEX: &str = "index.html";
const CUSTOM_DIR: &str = "./frontend-custom";

/// Vite 产物目录，文件名带内容 hash
const HASHED_DIR: &str = "assets/";

struct Asset<'a> {
    path: &'a str,
    data: Cow<'static, [u8]>,
}

impl Asset<'_> {
    fn content_type(&self) -> &'static str {
        let ext = Path::new(self.path)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("");
        match ext {
            "html" => "text/html; charset=utf-8",
            "js" => "text/javascript; charset=utf-8",
            "css" => "text/css; charset=utf-8",
            "json" | "webmanifest" => "application/json",
            "svg" => "image/svg+xml",
            "png" => "image/png",
            "ico" => "image/x-icon",
            "woff2" => "font/woff2",
            // 学生导入模板
            "csv" => "text/csv; charset=utf-8",
            "txt" => "text/plain; charset=utf-8",
            _ => "application/octet-stream",
        }
    }

    fn cache_control(&self) -> &'static str {
        if self.path.starts_with(HASHED_DIR) {
            "public, max-age=31536000, immutable"
        } else {
            "no-cache"
        }
    }

    fn is_html(&self) -> bool {
        self.path.ends_with(".html")
    }
}

/// 只接受普通的相对路径，拒绝 `..` 与绝对路径
fn is_safe_path(path: &str) -> bool {
    Path::new(path)
        .components()
        .all(|c| matches!(c, Component::Normal(_)))
}

fn load(path: &str) -> Option<Cow<'static, [u8]>> {
    if !is_safe_path(path) {
        return None;
    }
    if let Ok(data) = std::fs::read(Path::new(CUSTOM_DIR).join(path)) {
        return Some(Cow::Owned(data));
    }
    FrontendAssets::get(path).map(|file| file.data)
}

/// 请求路径到资源：文件直接返回，前端路由回落到 index.html，缺失的文件返回 None
fn resolve(path: &str) -> Option<Asset<'_>> {
    if path.is_empty() {
        return load(INDEX).map(|data| Asset { path: INDEX, data });
    }
    if let Some(data) = load(path) {
        return Some(Asset { path, data });
    }
    if Path::new(path).extension().is_some() {
        return None;
    }
    load(INDEX).map(|data| Asset { path: INDEX, data })
}

fn render_html(data: &[u8], system_name: &str) -> String {
    String::from_utf8_lossy(data).replace("%SYSTEM_NAME%", system_name)
}

pub async fn serve_frontend(req: HttpRequest) -> ActixResult<HttpResponse> {
    let path = req.match_info().query("tail").trim_start_matches('/');

    let Some(asset) = resolve(path) else {
        return Ok(HttpResponse::NotFound()
            .content_type(ContentType::plaintext())
            .body(format!("{path} not found")));
    };

    let mut response = HttpResponse::Ok();
    response
        .content_type(asset.content_type())
        .insert_header((CACHE_CONTROL, asset.cache_control()));

    if asset.is_html() {
        let system_name = &AppConfig::get().app.system_name;
        return Ok(response.body(render_html(&asset.data, system_name)));
    }
    Ok(response.body(asset.data.into_owned()))
}

/// 放在所有 API 路由之后
pub fn configure_frontend_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/{tail:.*}", web::get().to(serve_frontend));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn asset(path: &str) -> Asset<'_> {
        Asset {
            path,
            data: Cow::Borrowed(b""),
        }
    }

    #[test]
    fn test_content_type() {
        assert_eq!(asset("index.html").content_type(), "text/html; charset=utf-8");
        assert_eq!(
            asset("assets/index-3f2a.js").content_type(),
            "text/javascript; charset=utf-8"
        );
        assert_eq!(
            asset("modelo-importacao.csv").content_type(),
            "text/csv; charset=utf-8"
        );
        assert_eq!(asset("favicon.ico").content_type(), "image/x-icon");
        assert_eq!(asset("notas.xlsx").content_type(), "application/octet-stream");
    }

    #[test]
    fn test_cache_control() {
        assert_eq!(
            asset("assets/index-3f2a.css").cache_control(),
            "public, max-age=31536000, immutable"
        );
        assert_eq!(asset("index.html").cache_control(), "no-cache");
        // 根目录下的文件名不带 hash
        assert_eq!(asset("favicon.svg").cache_control(), "no-cache");
    }

    #[test]
    fn test_is_safe_path() {
        assert!(is_safe_path("assets/app.js"));
        assert!(!is_safe_path("../config.toml"));
        assert!(!is_safe_path("assets/../../etc/passwd"));
        assert!(!is_safe_path("/etc/passwd"));
    }

    #[test]
    fn test_resolve_falls_back_only_for_routes() {
        // build.rs 保证 dist 下至少有 index.html
        let route = resolve("turmas/12/notas").unwrap();
        assert_eq!(route.path, INDEX);
        assert!(resolve("").unwrap().is_html());

        assert!(resolve("assets/missing-0000.js").is_none());
        assert!(resolve("../Cargo.toml").is_none());
    }

    #[test]
    fn test_render_html_replaces_system_name() {
        let html = b"<title>%SYSTEM_NAME%</title>";
        assert_eq!(render_html(html, "NotaDez"), "<title>NotaDez</title>");
    }
}
