//! WebSocket chat hub
//!
//! Serves `/chathub`. Every connection owns its own [`GroupChat`]; only the
//! immutable [`GroupChatTemplate`] is shared between connections.
//!
//! Client frames are JSON objects tagged by `type`:
//!
//! | Frame | Effect |
//! |-------|--------|
//! | `{"type":"send_message","text":"..."}` | append a user message and run one turn cycle |
//! | `{"type":"reset"}` | start a new conversation |
//!
//! The server answers with serialized [`ConversationNotification`]s.

use super::sink::HubEventSink;
use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
    routing::get,
};
use futures::{SinkExt, StreamExt};
use recipe_chat_application::{GroupChat, GroupChatEventSink, GroupChatTemplate};
use recipe_chat_domain::ConversationNotification;
use serde::Deserialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// A frame sent by a hub client
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    SendMessage { text: String },
    Reset,
}

impl ClientFrame {
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

#[derive(Clone)]
struct HubState {
    template: Arc<GroupChatTemplate>,
}

/// Router exposing the hub at `/chathub`
pub fn router(template: Arc<GroupChatTemplate>) -> Router {
    Router::new()
        .route("/chathub", get(chat_hub))
        .with_state(HubState { template })
}

/// Bind and serve the hub until the process stops
pub async fn serve(bind: &str, template: Arc<GroupChatTemplate>) -> std::io::Result<()> {
    let listener = TcpListener::bind(bind).await?;
    info!("Chat hub listening on ws://{}/chathub", listener.local_addr()?);
    println!("Chat hub: ws://{}/chathub", listener.local_addr()?);
    axum::serve(listener, router(template)).await
}

async fn chat_hub(ws: WebSocketUpgrade, State(state): State<HubState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, state.template))
}

async fn handle_socket(socket: WebSocket, template: Arc<GroupChatTemplate>) {
    let (mut sender, mut receiver) = socket.split();
    let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel::<ConversationNotification>();
    let (frames_tx, frames_rx) = mpsc::unbounded_channel::<ClientFrame>();
    let busy = Arc::new(AtomicBool::new(false));
    let cancellation = CancellationToken::new();

    // Forward notifications to the socket
    let send_task = tokio::spawn(async move {
        while let Some(notification) = outbound_rx.recv().await {
            let json = match serde_json::to_string(&notification) {
                Ok(json) => json,
                Err(e) => {
                    warn!("Dropping unserializable notification: {}", e);
                    continue;
                }
            };
            if sender.send(Message::Text(json)).await.is_err() {
                break;
            }
        }
    });

    let conversation = tokio::spawn(run_conversation(
        template,
        frames_rx,
        HubEventSink::new(outbound_tx.clone()),
        Arc::clone(&busy),
        cancellation.clone(),
    ));

    while let Some(Ok(message)) = receiver.next().await {
        match message {
            Message::Text(text) => {
                if let Some(rejection) = admit_frame(&text, &busy, &frames_tx) {
                    let _ = outbound_tx.send(rejection);
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    debug!("Hub client disconnected");
    cancellation.cancel();
    drop(frames_tx);
    let _ = conversation.await;
    send_task.abort();
}

/// Parse a client frame and hand it to the conversation.
///
/// Returns the error notification to send back when the frame is rejected.
fn admit_frame(
    text: &str,
    busy: &AtomicBool,
    frames: &mpsc::UnboundedSender<ClientFrame>,
) -> Option<ConversationNotification> {
    let frame = match ClientFrame::parse(text) {
        Ok(frame) => frame,
        Err(e) => {
            return Some(ConversationNotification::error(
                Uuid::new_v4().to_string(),
                format!("Invalid frame: {e}"),
            ));
        }
    };

    if busy
        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
        .is_err()
    {
        return Some(ConversationNotification::error(
            Uuid::new_v4().to_string(),
            "A turn cycle is already running",
        ));
    }

    if frames.send(frame).is_err() {
        busy.store(false, Ordering::SeqCst);
        return Some(ConversationNotification::error(
            Uuid::new_v4().to_string(),
            "Conversation has ended",
        ));
    }
    None
}

/// Process frames for one connection until the client goes away
async fn run_conversation(
    template: Arc<GroupChatTemplate>,
    mut frames: mpsc::UnboundedReceiver<ClientFrame>,
    sink: HubEventSink,
    busy: Arc<AtomicBool>,
    cancellation: CancellationToken,
) {
    let mut chat = GroupChat::new(template);
    info!("Hub conversation {} opened", chat.id());

    while let Some(frame) = frames.recv().await {
        match frame {
            ClientFrame::SendMessage { text } => {
                let text = text.trim();
                if text.is_empty() {
                    sink.notify(ConversationNotification::error(
                        Uuid::new_v4().to_string(),
                        "Message text is empty",
                    ));
                } else {
                    let message = chat.append_user_message(text).clone();
                    sink.on_message(&Uuid::new_v4().to_string(), &message);

                    if let Err(e) = chat.run_turn_cycle(&sink, &cancellation).await {
                        if e.is_cancelled() {
                            break;
                        }
                        warn!("Turn cycle failed in conversation {}: {}", chat.id(), e);
                        sink.notify(ConversationNotification::error(
                            Uuid::new_v4().to_string(),
                            e.to_string(),
                        ));
                    }
                }
            }
            ClientFrame::Reset => chat.reset(),
        }
        busy.store(false, Ordering::SeqCst);
    }

    info!("Hub conversation {} closed", chat.id());
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use recipe_chat_application::{
        ApprovalTerminationPolicy, ChatRequest, GatewayError, LlmGateway, SelectionSettings,
        SelectionStrategy, SequentialSelectionPolicy, StreamHandle, TerminationSettings,
        TerminationStrategy,
    };
    use recipe_chat_domain::{NotificationType, ParticipantRegistry, Persona, StreamEvent};

    /// Builder streams two chunks, reviewer approves
    struct KitchenGateway;

    #[async_trait]
    impl LlmGateway for KitchenGateway {
        async fn stream_chat(&self, request: ChatRequest) -> Result<StreamHandle, GatewayError> {
            if request.system_prompt.starts_with("Review") {
                return Ok(StreamHandle::from_text("APPROVE"));
            }
            let (tx, rx) = mpsc::channel(4);
            tx.send(StreamEvent::Delta("Bean".to_string())).await.unwrap();
            tx.send(StreamEvent::Delta(" chili".to_string())).await.unwrap();
            tx.send(StreamEvent::Completed(String::new())).await.unwrap();
            Ok(StreamHandle::new(rx))
        }
    }

    fn template() -> Arc<GroupChatTemplate> {
        let registry = ParticipantRegistry::from_personas(vec![
            Persona::new("Builder", "Build a recipe"),
            Persona::new("Reviewer", "Review the recipe"),
        ])
        .unwrap();
        Arc::new(
            GroupChatTemplate::new(
                Arc::new(registry),
                Arc::new(KitchenGateway),
                SelectionStrategy::new(
                    Arc::new(SequentialSelectionPolicy),
                    SelectionSettings::default(),
                ),
                TerminationStrategy::new(
                    Arc::new(ApprovalTerminationPolicy),
                    TerminationSettings::default().with_eligible_participants(["Reviewer"]),
                ),
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_parse_frames() {
        assert_eq!(
            ClientFrame::parse(r#"{"type":"send_message","text":"Lunch please"}"#).unwrap(),
            ClientFrame::SendMessage {
                text: "Lunch please".to_string()
            }
        );
        assert_eq!(
            ClientFrame::parse(r#"{"type":"reset"}"#).unwrap(),
            ClientFrame::Reset
        );
        assert!(ClientFrame::parse(r#"{"type":"dance"}"#).is_err());
        assert!(ClientFrame::parse("hello").is_err());
    }

    #[test]
    fn test_busy_conversation_rejects_frames() {
        let (frames_tx, mut frames_rx) = mpsc::unbounded_channel();
        let busy = AtomicBool::new(false);
        let frame = r#"{"type":"send_message","text":"Soup"}"#;

        assert!(admit_frame(frame, &busy, &frames_tx).is_none());
        let rejection = admit_frame(frame, &busy, &frames_tx).unwrap();
        assert_eq!(rejection.notification_type, NotificationType::Error);
        assert!(frames_rx.try_recv().is_ok());
        assert!(frames_rx.try_recv().is_err());

        let rejection = admit_frame("not json", &AtomicBool::new(false), &frames_tx).unwrap();
        assert!(rejection.text.starts_with("Invalid frame"));
    }

    #[tokio::test]
    async fn test_conversation_emits_notifications_in_order() {
        let (frames_tx, frames_rx) = mpsc::unbounded_channel();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
        let busy = Arc::new(AtomicBool::new(true));

        frames_tx
            .send(ClientFrame::SendMessage {
                text: "Something with beans".to_string(),
            })
            .unwrap();
        drop(frames_tx);

        run_conversation(
            template(),
            frames_rx,
            HubEventSink::new(outbound_tx),
            Arc::clone(&busy),
            CancellationToken::new(),
        )
        .await;

        let mut sent = Vec::new();
        while let Ok(n) = outbound_rx.try_recv() {
            sent.push(n);
        }
        let kinds: Vec<NotificationType> = sent.iter().map(|n| n.notification_type).collect();
        assert_eq!(
            kinds,
            vec![
                NotificationType::UserMessage,
                NotificationType::SpeakerChange,
                NotificationType::AssistantMessage,
                NotificationType::AssistantMessage,
                NotificationType::AssistantMessage,
                NotificationType::SpeakerChange,
                NotificationType::AssistantMessage,
                NotificationType::AgentGroupChatTerminationUpdate,
                NotificationType::AgentGroupChatComplete,
            ]
        );
        assert_eq!(sent[0].text, "Something with beans");
        assert_eq!(sent[3].text, "Bean chili");
        assert_eq!(sent[2].message_id, sent[4].message_id);
        assert!(!busy.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancelled_conversation_stops() {
        let (frames_tx, frames_rx) = mpsc::unbounded_channel();
        let (outbound_tx, mut outbound_rx) = mpsc::unbounded_channel();
        let cancellation = CancellationToken::new();
        cancellation.cancel();

        frames_tx
            .send(ClientFrame::SendMessage {
                text: "Anything".to_string(),
            })
            .unwrap();

        run_conversation(
            template(),
            frames_rx,
            HubEventSink::new(outbound_tx),
            Arc::new(AtomicBool::new(true)),
            cancellation,
        )
        .await;

        let mut kinds = Vec::new();
        while let Ok(n) = outbound_rx.try_recv() {
            kinds.push(n.notification_type);
        }
        assert_eq!(kinds, vec![NotificationType::UserMessage]);
    }
}
