use crate::message::ChatRequest;

/// Fill the e-learning assistant template with one request's fields.
pub fn build_prompt(req: &ChatRequest) -> String {
    format!(
        r#"
Bạn là một trợ lý AI cho nền tảng e-learning.
Hãy trả lời bằng {language}.

Lịch sử trò chuyện (để tham khảo):
{history}

Nội dung tài liệu người dùng đang xem:
--- TÀI LIỆU ---
{document}
--- KẾT THÚC TÀI LIỆU ---

Từ điển/Thuật ngữ tùy chỉnh:
--- TỪ ĐIỂN ---
{dictionary}
--- KẾT THÚC TỪ ĐIỂN ---

Tin nhắn mới nhất của người dùng: "{message}"
"#,
        language = req.language.display_name(),
        history = req.conversation_history,
        document = req.document_content,
        dictionary = req.dictionary_content,
        message = req.message,
    )
}
