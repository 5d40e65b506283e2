//! Contact form submission flow.
//!
//! The form posts through an email relay and mirrors the visitor's details
//! into the chat widget. Both services are optional: a page without a relay
//! still acknowledges the visitor and hands the conversation to chat. A failed
//! send shows an inline error and re-enables the form; it is never retried.

use serde::Serialize;

/// Fields collected by `#contact-form`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub dealership: String,
    pub message: String,
}

impl ContactForm {
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Email relay routing: which service and template deliver the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailTemplate {
    pub service_id: String,
    pub template_id: String,
}

impl EmailTemplate {
    pub fn new(service_id: impl Into<String>, template_id: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            template_id: template_id.into(),
        }
    }
}

/// Relay acknowledgement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ack {
    pub status: u16,
    pub text: String,
}

/// Errors reported by an email relay.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SendError {
    #[error("Email relay rejected the message: {status} {text}")]
    Rejected { status: u16, text: String },

    #[error("Email relay unreachable: {0}")]
    Transport(String),
}

/// Sends a filled-in form through an email relay.
pub trait EmailSender {
    fn send(&self, template: &EmailTemplate, form: &ContactForm) -> Result<Ack, SendError>;
}

/// A command for the chat widget's command queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatCommand {
    SetEmail(String),
    SetPhone(String),
    SetNickname(String),
    SetSessionData(Vec<(String, String)>),
    Open,
}

impl ChatCommand {
    /// Commands that attach the form's details to the chat session.
    pub fn identify(form: &ContactForm) -> Vec<ChatCommand> {
        vec![
            Self::SetEmail(form.email.clone()),
            Self::SetPhone(form.phone.clone()),
            Self::SetNickname(form.name.clone()),
            Self::SetSessionData(vec![
                ("dealership".to_string(), form.dealership.clone()),
                ("message".to_string(), form.message.clone()),
            ]),
        ]
    }
}

/// The chat widget's command queue.
pub trait ChatWidget {
    fn push(&self, command: ChatCommand);
}

/// Tone of the inline form message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Success,
    Error,
}

/// Inline message shown in `#form-message`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormFeedback {
    pub tone: Tone,
    pub text: &'static str,
}

impl FormFeedback {
    pub const SENT: Self = Self {
        tone: Tone::Success,
        text: "Thank you! Your message has been sent successfully.",
    };

    pub const RECEIVED: Self = Self {
        tone: Tone::Success,
        text: "Thank you! Your message has been received. Our team will reach out shortly.",
    };

    pub const FAILED: Self = Self {
        tone: Tone::Error,
        text: "Sorry, there was an error sending your message. Please try again.",
    };

    /// `(background, text colour, border)` for the message box.
    pub fn palette(&self) -> (&'static str, &'static str, &'static str) {
        match self.tone {
            Tone::Success => ("#d4edda", "#155724", "1px solid #c3e6cb"),
            Tone::Error => ("#f8d7da", "#721c24", "1px solid #f5c6cb"),
        }
    }
}

/// The form's on-page elements.
pub trait FormView {
    fn set_submit(&mut self, enabled: bool, label: &str);
    fn hide_message(&mut self);
    fn show_message(&mut self, feedback: &FormFeedback);
}

/// Drives one submission of the contact form.
pub struct ContactController {
    template: EmailTemplate,
    sender: Option<Box<dyn EmailSender>>,
    chat: Option<Box<dyn ChatWidget>>,
}

impl ContactController {
    pub fn new(template: EmailTemplate) -> Self {
        Self {
            template,
            sender: None,
            chat: None,
        }
    }

    pub fn with_sender(mut self, sender: impl EmailSender + 'static) -> Self {
        self.sender = Some(Box::new(sender));
        self
    }

    pub fn with_chat(mut self, chat: impl ChatWidget + 'static) -> Self {
        self.chat = Some(Box::new(chat));
        self
    }

    /// Submit `form`, updating `view` as the browser handler would.
    ///
    /// The form is cleared on success and kept on failure so the visitor can
    /// try again.
    pub fn submit(&self, form: &mut ContactForm, view: &mut dyn FormView) -> FormFeedback {
        if let Some(chat) = &self.chat {
            for command in ChatCommand::identify(form) {
                chat.push(command);
            }
        }

        view.set_submit(false, "Sending...");
        view.hide_message();

        let feedback = match &self.sender {
            Some(sender) => match sender.send(&self.template, form) {
                Ok(_) => FormFeedback::SENT,
                Err(e) => {
                    tracing::error!("Email relay error: {}", e);
                    FormFeedback::FAILED
                }
            },
            None => FormFeedback::RECEIVED,
        };

        view.show_message(&feedback);
        if feedback.tone == Tone::Success {
            form.reset();
        }
        view.set_submit(true, "Submit");

        if let Some(chat) = &self.chat {
            chat.push(ChatCommand::Open);
        }

        feedback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct StubSender(Result<Ack, SendError>);

    impl EmailSender for StubSender {
        fn send(&self, _: &EmailTemplate, _: &ContactForm) -> Result<Ack, SendError> {
            self.0.clone()
        }
    }

    #[derive(Clone, Default)]
    struct RecordingChat(Rc<RefCell<Vec<ChatCommand>>>);

    impl ChatWidget for RecordingChat {
        fn push(&self, command: ChatCommand) {
            self.0.borrow_mut().push(command);
        }
    }

    #[derive(Default)]
    struct RecordingView(Vec<String>);

    impl FormView for RecordingView {
        fn set_submit(&mut self, enabled: bool, label: &str) {
            self.0.push(format!("submit:{enabled}:{label}"));
        }
        fn hide_message(&mut self) {
            self.0.push("hide".to_string());
        }
        fn show_message(&mut self, feedback: &FormFeedback) {
            self.0.push(format!("show:{}", feedback.text));
        }
    }

    fn filled() -> ContactForm {
        ContactForm {
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
            phone: "555".to_string(),
            dealership: "North Motors".to_string(),
            message: "Hi".to_string(),
        }
    }

    fn template() -> EmailTemplate {
        EmailTemplate::new("service", "template")
    }

    #[test]
    fn successful_send_resets_form() {
        let controller = ContactController::new(template()).with_sender(StubSender(Ok(Ack {
            status: 200,
            text: "OK".to_string(),
        })));
        let mut form = filled();
        let mut view = RecordingView::default();

        let feedback = controller.submit(&mut form, &mut view);

        assert_eq!(feedback, FormFeedback::SENT);
        assert_eq!(form, ContactForm::default());
        assert_eq!(
            view.0,
            vec![
                "submit:false:Sending...".to_string(),
                "hide".to_string(),
                format!("show:{}", FormFeedback::SENT.text),
                "submit:true:Submit".to_string(),
            ]
        );
    }

    #[test]
    fn failed_send_keeps_form_and_reenables_submit() {
        let controller = ContactController::new(template())
            .with_sender(StubSender(Err(SendError::Transport("offline".to_string()))));
        let mut form = filled();
        let mut view = RecordingView::default();

        let feedback = controller.submit(&mut form, &mut view);

        assert_eq!(feedback, FormFeedback::FAILED);
        assert_eq!(feedback.palette().0, "#f8d7da");
        assert_eq!(form, filled());
        assert_eq!(view.0.last().map(String::as_str), Some("submit:true:Submit"));
    }

    #[test]
    fn without_relay_hands_off_to_chat() {
        let chat = RecordingChat::default();
        let controller = ContactController::new(template()).with_chat(chat.clone());
        let mut form = filled();

        let feedback = controller.submit(&mut form, &mut RecordingView::default());

        assert_eq!(feedback, FormFeedback::RECEIVED);
        let commands = chat.0.borrow();
        assert_eq!(commands[0], ChatCommand::SetEmail("ada@example.com".to_string()));
        assert_eq!(commands[2], ChatCommand::SetNickname("Ada".to_string()));
        assert_eq!(commands.last(), Some(&ChatCommand::Open));
        assert_eq!(commands.len(), 5);
    }
}
