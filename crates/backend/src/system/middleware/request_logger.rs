use axum::body::to_bytes;
use axum::body::Body;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use chrono::Local;

use crate::shared::format::format_number;

/// Middleware для логирования HTTP запросов
///
/// Выводит в консоль время, длительность, размер ответа, статус, метод и путь.
/// Ошибки (не 2xx) дополнительно уходят в tracing на уровне warn.
pub async fn request_logger(req: Request<Body>, next: Next) -> Response {
    let start = std::time::Instant::now();
    let method = req.method().clone();
    let uri = req.uri().clone();

    let response = next.run(req).await;
    let (parts, body) = response.into_parts();

    // Читаем тело ответа, чтобы узнать реальный размер
    let (bytes, size_label) = match to_bytes(body, usize::MAX).await {
        Ok(b) => {
            let label = format_number(b.len());
            (b, label)
        }
        Err(_) => (Default::default(), "error".to_string()),
    };

    let status = parts.status.as_u16();
    // Голубой для успешных, коричневый для остальных
    let color_code = if parts.status.is_success() { "36" } else { "33" };

    println!(
        "\x1b[{}m{}\x1b[0m | {:>5}ms | {:>12} | {} {:>6} {}",
        color_code,
        Local::now().format("%H:%M:%S"),
        start.elapsed().as_millis(),
        size_label,
        status,
        method,
        uri.path()
    );

    if !parts.status.is_success() {
        tracing::warn!("{} {} -> {}", method, uri.path(), status);
    }

    Response::from_parts(parts, Body::from(bytes))
}
