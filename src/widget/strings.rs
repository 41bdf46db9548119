//! User-visible strings of the widget.

use serde::Deserialize;

/// Language of the widget's own messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Fr,
    En,
}

impl Locale {
    /// BCP 47 tag for the `lang` attribute.
    #[must_use]
    pub fn lang_tag(self) -> &'static str {
        match self {
            Self::Fr => "fr",
            Self::En => "en",
        }
    }
}

/// Fixed texts the widget renders on its own behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strings {
    /// Single entry shown after a successful reset.
    pub greeting: &'static str,
    /// Prepended to the server-reported error of a `success: false` reply.
    pub error_prefix: &'static str,
    /// Shown when the chat call could not complete.
    pub connection_error: &'static str,
    /// Shown when the reset call could not complete.
    pub reset_error: &'static str,
    /// Label of the send control.
    pub send_label: &'static str,
    /// Label of the reset control.
    pub reset_label: &'static str,
    /// Placeholder of the message field.
    pub placeholder: &'static str,
}

impl Strings {
    #[must_use]
    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::Fr => Self::french(),
            Locale::En => Self::english(),
        }
    }

    #[must_use]
    pub fn french() -> Self {
        Self {
            greeting: "Salut ! Je suis un chatbot complètement déjanté. Pose-moi une question, mais ne t'attends pas à une réponse normale...",
            error_prefix: "Oups ! Une erreur s'est produite: ",
            connection_error: "Erreur de connexion au serveur. Veuillez réessayer.",
            reset_error: "Erreur lors de la réinitialisation.",
            send_label: "Envoyer",
            reset_label: "Nouvelle conversation",
            placeholder: "Écris ton message...",
        }
    }

    #[must_use]
    pub fn english() -> Self {
        Self {
            greeting: "Hi! I'm a completely unhinged chatbot. Ask me anything, but don't expect a normal answer...",
            error_prefix: "Oops! Something went wrong: ",
            connection_error: "Could not reach the server. Please try again.",
            reset_error: "Could not reset the conversation.",
            send_label: "Send",
            reset_label: "New conversation",
            placeholder: "Type your message...",
        }
    }

    /// Text rendered for a `success: false` reply.
    #[must_use]
    pub fn application_error(&self, error: &str) -> String {
        format!("{}{error}", self.error_prefix)
    }
}

impl Default for Strings {
    fn default() -> Self {
        Self::for_locale(Locale::default())
    }
}
