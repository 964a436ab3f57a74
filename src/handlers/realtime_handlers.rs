use actix_web::{HttpRequest, HttpResponse, web};
use actix_ws::Message;
use serde::Deserialize;

use crate::errors::AppError;
use crate::models::{Meeting, Notulensi, Record, Task, User};
use crate::realtime::ChangeHub;

const TABLES: [&str; 4] = [
    Meeting::COLLECTION,
    Notulensi::COLLECTION,
    Task::COLLECTION,
    User::COLLECTION,
];

#[derive(Debug, Deserialize)]
pub struct Subscription {
    pub table: String,
}

/// GET /api/realtime?table=<name>: websocket carrying change events of one
/// table.
pub async fn ws_connect(
    req: HttpRequest,
    body: web::Payload,
    hub: web::Data<ChangeHub>,
    query: web::Query<Subscription>,
) -> Result<HttpResponse, actix_web::Error> {
    let table = query.into_inner().table;
    if !TABLES.contains(&table.as_str()) {
        return Err(AppError::Validation(format!("Unknown table '{table}'")).into());
    }

    let (response, mut ws_session, mut msg_stream) = actix_ws::handle(&req, body)?;
    let mut rx = hub.subscribe(&table);
    let hub = hub.into_inner();
    log::debug!("Realtime subscriber joined {table}");

    actix_web::rt::spawn(async move {
        loop {
            tokio::select! {
                Some(msg) = rx.recv() => {
                    if ws_session.text(msg).await.is_err() {
                        break;
                    }
                }
                Some(Ok(msg)) = msg_stream.recv() => {
                    match msg {
                        Message::Ping(bytes) => {
                            if ws_session.pong(&bytes).await.is_err() {
                                break;
                            }
                        }
                        Message::Close(_) => break,
                        _ => {}
                    }
                }
                else => break,
            }
        }

        drop(rx);
        let _ = ws_session.close(None).await;
        hub.prune(&table);
        log::debug!("Realtime subscriber left {table}");
    });

    Ok(response)
}
