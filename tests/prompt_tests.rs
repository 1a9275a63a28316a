use chat_relay::message::{ChatRequest, Language};
use chat_relay::services::prompt::build_prompt;

fn request() -> ChatRequest {
    ChatRequest {
        message: "Giải thích khái niệm đệ quy".to_string(),
        conversation_history: "user: xin chào\nassistant: chào bạn".to_string(),
        document_content: "Đệ quy là khi một hàm tự gọi chính nó.".to_string(),
        dictionary_content: "recursion = đệ quy".to_string(),
        language: Language::Vi,
    }
}

#[test]
fn test_prompt_places_every_field() {
    let prompt = build_prompt(&request());

    assert!(prompt.contains("Bạn là một trợ lý AI cho nền tảng e-learning."));
    assert!(prompt.contains("Hãy trả lời bằng Tiếng Việt."));
    assert!(prompt.contains(
        "Lịch sử trò chuyện (để tham khảo):\nuser: xin chào\nassistant: chào bạn\n"
    ));
    assert!(prompt.contains(
        "--- TÀI LIỆU ---\nĐệ quy là khi một hàm tự gọi chính nó.\n--- KẾT THÚC TÀI LIỆU ---"
    ));
    assert!(prompt.contains("--- TỪ ĐIỂN ---\nrecursion = đệ quy\n--- KẾT THÚC TỪ ĐIỂN ---"));
    assert!(prompt.contains("Tin nhắn mới nhất của người dùng: \"Giải thích khái niệm đệ quy\""));
}

#[test]
fn test_prompt_sections_are_ordered() {
    let prompt = build_prompt(&request());
    let positions: Vec<usize> = [
        "Hãy trả lời bằng",
        "Lịch sử trò chuyện",
        "--- TÀI LIỆU ---",
        "--- TỪ ĐIỂN ---",
        "Tin nhắn mới nhất",
    ]
    .iter()
    .map(|marker| prompt.find(marker).unwrap())
    .collect();

    assert!(positions.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_english_instruction() {
    let req = ChatRequest { language: Language::En, ..request() };
    let prompt = build_prompt(&req);
    assert!(prompt.contains("Hãy trả lời bằng English."));
    assert!(!prompt.contains("Tiếng Việt"));
}

#[test]
fn test_prompt_is_deterministic() {
    assert_eq!(build_prompt(&request()), build_prompt(&request()));
}

#[test]
fn test_empty_request_renders_template() {
    let prompt = build_prompt(&ChatRequest::default());
    assert!(prompt.contains("--- TÀI LIỆU ---\n\n--- KẾT THÚC TÀI LIỆU ---"));
    assert!(prompt.trim_end().ends_with("Tin nhắn mới nhất của người dùng: \"\""));
}
