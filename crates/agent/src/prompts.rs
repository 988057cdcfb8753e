//! Prompt text for each triage step. Every prompt is one system turn plus one user turn.

use supportdesk_core::domain::records::UNKNOWN_VALUE;

use crate::llm::ChatMessage;

pub fn classification(message: &str) -> Vec<ChatMessage> {
    let prompt = format!(
        "You classify customer service messages. Decide whether the message below is a \
         'bug_report', a 'feature_request', or a 'general_inquiry'. Errors and broken behaviour \
         are bug_report. Requests for new capabilities are feature_request. Questions and general \
         comments are general_inquiry. Give a confidence_score between 0 and 1 for your choice. \
         Answer with a JSON object with the keys 'classification' and 'confidence_score'.\n\n\
         Customer message: \"{message}\""
    );
    vec![
        ChatMessage::system("You are a helpful assistant that classifies customer messages."),
        ChatMessage::user(prompt),
    ]
}

pub fn bug_report(message: &str, components: &[&str]) -> Vec<ChatMessage> {
    let prompt = format!(
        "Extract bug report details from the customer message below: 'title', \
         'reproduction_steps' as a list, and 'affected_components' as a list. Pick affected \
         components only from this list: {components}. When a field cannot be determined from \
         the message use the value '{UNKNOWN_VALUE}'. Answer with a JSON object with these keys.\n\n\
         Customer message: \"{message}\"",
        components = render_list(components),
    );
    vec![
        ChatMessage::system("You are an expert at extracting structured bug report details."),
        ChatMessage::user(prompt),
    ]
}

pub fn feature_request(message: &str, components: &[&str], description: &str) -> Vec<ChatMessage> {
    let prompt = format!(
        "Extract feature request details from the customer message below: 'title', \
         'description', 'user_story', 'business_value', and 'affected_components' as a list. \
         Write a short relevant title. Pick affected components only from this list: \
         {components}. Set 'business_value' to High, Medium, or Low judged against the \
         application description: {description}. Fill in only what the message supports and do \
         not invent details. When a field cannot be determined use the value '{UNKNOWN_VALUE}' \
         and list its name in 'missing_fields'. Answer with a JSON object with these keys.\n\n\
         Customer message: \"{message}\"",
        components = render_list(components),
    );
    vec![
        ChatMessage::system("You are an expert at extracting structured feature request details."),
        ChatMessage::user(prompt),
    ]
}

pub fn general_inquiry(message: &str, categories: &[&str]) -> Vec<ChatMessage> {
    let prompt = format!(
        "Determine the inquiry category of the customer message below. 'inquiry_category' must \
         be one of: {categories}, or 'Other' when none fits. Set 'requires_human_review' to true \
         when the category cannot be identified or the customer could not solve the problem with \
         the resources available. Fill in only what the message supports and do not invent \
         details. Answer with a JSON object with the keys 'inquiry_category' and \
         'requires_human_review'.\n\n\
         Customer message: \"{message}\"",
        categories = render_list(categories),
    );
    vec![
        ChatMessage::system("You are an expert at extracting structured general inquiry details."),
        ChatMessage::user(prompt),
    ]
}

fn render_list(items: &[&str]) -> String {
    if items.is_empty() {
        return "(none configured)".to_string();
    }
    items.iter().map(|item| format!("'{item}'")).collect::<Vec<_>>().join(", ")
}
