//! Internationalization (i18n) module.
//!
//! Provides localized strings for the UI, CLI output and user notices.
//! English is the default language; Spanish is available as an alternative.

use std::sync::OnceLock;

static CURRENT_LANG: OnceLock<Lang> = OnceLock::new();

/// Supported languages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lang {
    /// English (default)
    En,
    /// Spanish
    Es,
}

impl Lang {
    /// Parse a language code string (e.g. "en", "es", "en_US", "es_ES").
    /// Returns `None` for unrecognized codes.
    pub fn from_code(code: &str) -> Option<Self> {
        let normalized = code.to_lowercase();
        let prefix = normalized.split(['_', '-', '.']).next().unwrap_or("");
        match prefix {
            "en" => Some(Self::En),
            "es" => Some(Self::Es),
            _ => None,
        }
    }

    /// Return the ISO 639-1 code for this language.
    pub fn code(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
        }
    }
}

/// Initialize the global language. Call once at startup.
/// If already initialized, this is a no-op.
pub fn set_lang(lang: Lang) {
    let _ = CURRENT_LANG.set(lang);
}

/// Get the currently configured language (defaults to English).
pub fn lang() -> Lang {
    CURRENT_LANG.get().copied().unwrap_or(Lang::En)
}

/// Detect language from `SENDSHELL_LANG`, then `LC_MESSAGES` / `LANG`.
pub fn detect_system_lang() -> Lang {
    std::env::var("SENDSHELL_LANG")
        .ok()
        .and_then(|v| Lang::from_code(&v))
        .or_else(|| {
            std::env::var("LC_MESSAGES")
                .ok()
                .and_then(|v| Lang::from_code(&v))
        })
        .or_else(|| std::env::var("LANG").ok().and_then(|v| Lang::from_code(&v)))
        .unwrap_or(Lang::En)
}

/// Macro for defining translatable message functions.
/// Each function returns a `&'static str` based on the current language.
macro_rules! msg {
    ($name:ident, $en:expr, $es:expr) => {
        /// Returns a localized string for the current language.
        pub fn $name() -> &'static str {
            match lang() {
                Lang::En => $en,
                Lang::Es => $es,
            }
        }
    };
}

// ── General ──────────────────────────────────────────────────────

msg!(app_name, "sendShell", "sendShell");
msg!(
    app_about,
    "sendShell \u{2014} Terminal mail composer. Sign in with Google, write a message with one attachment and hand it to your mail gateway.",
    "sendShell \u{2014} Compositor de correo en terminal. Inicia sesi\u{f3}n con Google, escribe un mensaje con un adjunto y env\u{ed}alo a tu pasarela de correo."
);
msg!(
    app_long_about,
    "sendShell \u{2014} Terminal mail composer.\nSign in with Google (OAuth implicit grant), write a message with one\nattachment and submit it to your mail gateway. Built in Rust.",
    "sendShell \u{2014} Compositor de correo en terminal.\nInicia sesi\u{f3}n con Google (OAuth impl\u{ed}cito), escribe un mensaje con un\nadjunto y env\u{ed}alo a tu pasarela de correo. Escrito en Rust."
);
msg!(
    app_after_help,
    "Gateway URL: set gateway.base_url in the config file or SENDSHELL_API_BASE_URL.",
    "URL de la pasarela: define gateway.base_url en el fichero de configuraci\u{f3}n o SENDSHELL_API_BASE_URL."
);

// ── CLI help strings ─────────────────────────────────────────────

msg!(
    help_cmd_compose,
    "Open the composer in the TUI (default if no subcommand given)",
    "Abrir el compositor en la TUI (por defecto si no se da subcomando)"
);
msg!(
    help_cmd_login,
    "Sign in with Google and show the account",
    "Iniciar sesi\u{f3}n con Google y mostrar la cuenta"
);
msg!(
    help_cmd_send,
    "Send a message without the TUI",
    "Enviar un mensaje sin la TUI"
);
msg!(
    help_cmd_config,
    "Show or initialize the configuration file",
    "Mostrar o crear el fichero de configuraci\u{f3}n"
);
msg!(
    help_cmd_completions,
    "Generate shell completions",
    "Generar completions para tu shell"
);
msg!(
    help_cmd_manpage,
    "Generate a man page",
    "Generar p\u{e1}gina de manual"
);

// ── Notices ──────────────────────────────────────────────────────

msg!(
    err_all_fields_required,
    "All fields are required!",
    "\u{a1}Todos los campos son obligatorios!"
);
msg!(
    err_login_failed,
    "Login failed. Please try again.",
    "Error al iniciar sesi\u{f3}n. Int\u{e9}ntalo de nuevo."
);
msg!(
    err_login_denied,
    "Login was cancelled or denied.",
    "Inicio de sesi\u{f3}n cancelado o denegado."
);
msg!(
    err_login_in_progress,
    "Sign-in is already in progress",
    "El inicio de sesi\u{f3}n ya est\u{e1} en curso"
);
msg!(
    err_user_info,
    "Failed to fetch user info",
    "No se pudo obtener la informaci\u{f3}n del usuario"
);
msg!(
    err_send_failed,
    "Failed to send email",
    "No se pudo enviar el correo"
);
msg!(
    err_send_in_progress,
    "A message is already being sent",
    "Ya se est\u{e1} enviando un mensaje"
);
msg!(
    err_attachment,
    "Cannot attach file",
    "No se puede adjuntar el fichero"
);
msg!(msg_email_sent, "Email sent", "Correo enviado");
msg!(msg_signed_in_as, "Signed in as", "Sesi\u{f3}n iniciada como");
msg!(
    msg_open_url,
    "Open this URL in your browser to sign in",
    "Abre esta URL en tu navegador para iniciar sesi\u{f3}n"
);
msg!(
    msg_waiting_for_browser,
    "Waiting for the browser sign-in...",
    "Esperando el inicio de sesi\u{f3}n en el navegador..."
);
msg!(msg_sending, "Sending...", "Enviando...");
msg!(msg_attached, "Attached", "Adjuntado");

// ── TUI Widget titles and labels ────────────────────────────────

msg!(tui_help_title, " Help ", " Ayuda ");
msg!(
    tui_help_description,
    "Terminal mail composer",
    "Compositor de correo en terminal"
);
msg!(tui_compose_title, " Compose ", " Redactar ");
msg!(tui_login_title, " Sign in ", " Iniciar sesi\u{f3}n ");
msg!(
    tui_login_button,
    "[ Sign in with Google ]",
    "[ Iniciar sesi\u{f3}n con Google ]"
);
msg!(
    tui_login_pending,
    "Finish signing in in your browser...",
    "Completa el inicio de sesi\u{f3}n en tu navegador..."
);
msg!(
    tui_login_hint,
    "Press Enter to sign in",
    "Pulsa Enter para iniciar sesi\u{f3}n"
);
msg!(tui_welcome, "Welcome,", "Bienvenido/a,");
msg!(tui_field_to, "To", "Para");
msg!(tui_field_subject, "Subject", "Asunto");
msg!(tui_field_message, "Message", "Mensaje");
msg!(tui_field_attachment, "Attach a File", "Adjuntar fichero");
msg!(
    tui_attachment_placeholder,
    "type a path and press Enter",
    "escribe una ruta y pulsa Enter"
);
msg!(tui_send_button, "[ Send Email ]", "[ Enviar correo ]");
msg!(tui_sending_button, "[ Sending... ]", "[ Enviando... ]");
msg!(tui_state_idle, "ready", "listo");
msg!(tui_state_sending, "sending", "enviando");
msg!(tui_state_sent, "sent", "enviado");
msg!(tui_state_failed, "failed", "fallido");
msg!(tui_help_hint, " [F1] Help ", " [F1] Ayuda ");

// ── Help popup ──────────────────────────────────────────────────

msg!(tui_help_editing, "Editing", "Edici\u{f3}n");
msg!(tui_help_general, "General", "General");
msg!(tui_help_next_field, "Next field", "Campo siguiente");
msg!(tui_help_prev_field, "Previous field", "Campo anterior");
msg!(tui_help_newline, "New line in message", "Nueva l\u{ed}nea en mensaje");
msg!(tui_help_load_file, "Load attachment", "Cargar adjunto");
msg!(tui_help_detach, "Remove attachment", "Quitar adjunto");
msg!(tui_help_send, "Send", "Enviar");
msg!(tui_help_sign_in, "Sign in", "Iniciar sesi\u{f3}n");
msg!(tui_help_this_help, "This help", "Esta ayuda");
msg!(tui_help_quit, "Quit", "Salir");

// ── Status bar hints ────────────────────────────────────────────

msg!(tui_hint_field, "Field", "Campo");
msg!(tui_hint_send, "Send", "Enviar");
msg!(tui_hint_attach, "Attach", "Adjuntar");
msg!(tui_hint_sign_in, "Sign in", "Entrar");
msg!(tui_hint_help, "Help", "Ayuda");
msg!(tui_hint_quit, "Quit", "Salir");
msg!(tui_hint_close, "Close", "Cerrar");
