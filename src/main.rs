use anyhow::{Context, Result};
use locale_config::binding::{LocaleBinding, View, ViewUpdate};
use locale_config::config::Config;
use locale_config::i18n::Locale;
use locale_config::services::Services;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;

const SAMPLE_KEYS: [&str; 3] = ["LoginSuccess", "LoginFail", "NetworkError"];

/// Prints the sample texts whenever the locale changes.
struct ConsoleView {
    services: Rc<Services>,
}

impl ConsoleView {
    fn render(&self) {
        let model = self.services.model();
        println!("[{}]", model.current_locale());
        for key in SAMPLE_KEYS {
            println!("  {:<14} {}", key, model.lang_text(key));
        }
    }
}

impl View for ConsoleView {
    fn update_view(&mut self, update: &ViewUpdate) {
        if update.is_locale_change() {
            self.render();
        }
    }
}

fn main() -> Result<()> {
    // Load .env file (ignored when absent)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("locale_config=info".parse()?),
        )
        .init();

    let config = Config::from_env()?;
    let requested = std::env::args()
        .nth(1)
        .map(|arg| Locale::parse(&arg).with_context(|| format!("Invalid locale '{}'", arg)))
        .transpose()?;

    let services = Rc::new(Services::from_config(&config));
    let model = services.model();

    let dialog = model.dialog();
    println!("Dialog: {}x{}", dialog.width, dialog.height);
    println!("Click sound: {}", model.audio_path("BtnClick"));
    println!("Dialog background: {}", model.resource_path("DialogBg"));

    let view = Rc::new(RefCell::new(ConsoleView {
        services: Rc::clone(&services),
    }));
    view.borrow().render();
    let binding = LocaleBinding::bind(services.localization(), &view);

    if let Some(locale) = requested {
        if !services.localization().is_known(&locale) {
            info!("Locale {} is not in the table", locale);
        }
        if !model.switch_locale(locale.clone()) {
            info!("Locale {} is already active", locale);
        }
    }

    binding.dispose();
    Ok(())
}
