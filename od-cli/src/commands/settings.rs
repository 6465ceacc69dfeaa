//! Settings commands.

use clap::Subcommand;
use console::style;

use od_core::config::{AppConfig, ConfigHandle};
use od_core::error::OdResult;
use crate::OutputFormat;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// List/show all settings (alias for show).
    List,
    /// Show all settings.
    Show,
    /// Get a specific setting value by key path.
    Get {
        /// Setting key path (e.g., "backend.base_url", "polling.interval_secs").
        key: String,
    },
    /// Set a specific setting value by key path.
    Set {
        /// Setting key path (e.g., "backend.base_url", "polling.interval_secs").
        key: String,
        /// New value.
        value: String,
    },
    /// Set the backend base URL.
    SetUrl {
        /// Backend base URL.
        url: String,
    },
    /// Set the completion API key.
    SetApiKey {
        /// Completion API key.
        key: String,
    },
    /// Export settings to a file.
    Export {
        /// Output file path.
        path: String,
    },
    /// Import settings from a file.
    Import {
        /// Input file path.
        path: String,
    },
}

/// Resolve a dot-separated key path to a value from the config.
fn get_setting_value(cfg: &AppConfig, key: &str) -> Option<String> {
    match key {
        "backend.base_url" => Some(cfg.backend.base_url.clone()),
        "backend.timeout_ms" | "backend.timeout" => Some(cfg.backend.timeout_ms.to_string()),
        "backend.accept_invalid_certs" => Some(cfg.backend.accept_invalid_certs.to_string()),
        "assistant.api_base" => Some(cfg.assistant.api_base.clone()),
        "assistant.api_key" => Some("********".to_string()),
        "assistant.model" => Some(cfg.assistant.model.clone()),
        "assistant.system_prompt" => Some(cfg.assistant.system_prompt.clone()),
        "store.wal_mode" => Some(cfg.store.wal_mode.to_string()),
        "store.pool_size" => Some(cfg.store.pool_size.to_string()),
        "store.integrity_check_on_startup" => {
            Some(cfg.store.integrity_check_on_startup.to_string())
        }
        "polling.interval_secs" | "polling.interval" => {
            Some(cfg.polling.interval_secs.to_string())
        }
        "logging.level" | "log.level" => Some(cfg.logging.level.clone()),
        "logging.json_output" => Some(cfg.logging.json_output.to_string()),
        "notifications.enabled" => Some(cfg.notifications.enabled.to_string()),
        "notifications.notify_job_events" => {
            Some(cfg.notifications.notify_job_events.to_string())
        }
        "notifications.notify_session_expired" => {
            Some(cfg.notifications.notify_session_expired.to_string())
        }
        _ => None,
    }
}

/// Apply a value to a dot-separated key path on the config.
fn set_setting_value(cfg: &mut AppConfig, key: &str, value: &str) -> Result<(), String> {
    match key {
        "backend.base_url" => {
            cfg.backend.base_url = AppConfig::sanitize_base_url(value);
        }
        "backend.timeout_ms" | "backend.timeout" => {
            cfg.backend.timeout_ms = value.parse().map_err(|_| "invalid integer".to_string())?;
        }
        "backend.accept_invalid_certs" => {
            cfg.backend.accept_invalid_certs =
                value.parse().map_err(|_| "expected true/false".to_string())?;
        }
        "assistant.api_base" => {
            cfg.assistant.api_base = value.to_string();
        }
        "assistant.api_key" => {
            cfg.assistant.api_key = value.to_string();
        }
        "assistant.model" => {
            cfg.assistant.model = value.to_string();
        }
        "assistant.system_prompt" => {
            cfg.assistant.system_prompt = value.to_string();
        }
        "store.wal_mode" => {
            cfg.store.wal_mode = value.parse().map_err(|_| "expected true/false".to_string())?;
        }
        "store.pool_size" => {
            cfg.store.pool_size = value.parse().map_err(|_| "invalid integer".to_string())?;
        }
        "polling.interval_secs" | "polling.interval" => {
            let secs: u64 = value.parse().map_err(|_| "invalid integer".to_string())?;
            // Zero would spin the poll loop; clamp to one second.
            cfg.polling.interval_secs = secs.max(1);
        }
        "logging.level" | "log.level" => {
            let v = value.to_lowercase();
            if !["trace", "debug", "info", "warn", "error"].contains(&v.as_str()) {
                return Err("expected one of: trace, debug, info, warn, error".to_string());
            }
            cfg.logging.level = v;
        }
        "logging.json_output" => {
            cfg.logging.json_output =
                value.parse().map_err(|_| "expected true/false".to_string())?;
        }
        "notifications.enabled" => {
            cfg.notifications.enabled =
                value.parse().map_err(|_| "expected true/false".to_string())?;
        }
        "notifications.notify_job_events" => {
            cfg.notifications.notify_job_events =
                value.parse().map_err(|_| "expected true/false".to_string())?;
        }
        "notifications.notify_session_expired" => {
            cfg.notifications.notify_session_expired =
                value.parse().map_err(|_| "expected true/false".to_string())?;
        }
        _ => {
            return Err(format!("unknown setting key: {key}"));
        }
    }
    Ok(())
}

fn print_settings_text(cfg: &AppConfig) {
    println!("{}", style("Backend").bold().underlined());
    println!("  backend.base_url                  {}", cfg.backend.base_url);
    println!("  backend.timeout_ms                {}", cfg.backend.timeout_ms);
    println!("  backend.accept_invalid_certs      {}", cfg.backend.accept_invalid_certs);

    println!();
    println!("{}", style("Assistant").bold().underlined());
    println!("  assistant.api_base                {}", cfg.assistant.api_base);
    let key_state = if cfg.assistant.api_key.is_empty() { "(not set)" } else { "********" };
    println!("  assistant.api_key                 {key_state}");
    println!("  assistant.model                   {}", cfg.assistant.model);
    println!("  assistant.system_prompt           {}", cfg.assistant.system_prompt);

    println!();
    println!("{}", style("Store").bold().underlined());
    println!("  store.wal_mode                    {}", cfg.store.wal_mode);
    println!("  store.pool_size                   {}", cfg.store.pool_size);
    println!("  store.integrity_check_on_startup  {}", cfg.store.integrity_check_on_startup);

    println!();
    println!("{}", style("Polling").bold().underlined());
    println!("  polling.interval_secs             {}", cfg.polling.interval_secs);

    println!();
    println!("{}", style("Logging").bold().underlined());
    println!("  logging.level                     {}", cfg.logging.level);
    println!("  logging.json_output               {}", cfg.logging.json_output);

    println!();
    println!("{}", style("Notifications").bold().underlined());
    println!("  notifications.enabled             {}", cfg.notifications.enabled);
    println!("  notifications.notify_job_events   {}", cfg.notifications.notify_job_events);
    println!("  notifications.notify_session_expired {}", cfg.notifications.notify_session_expired);
}

fn settings_json(cfg: &AppConfig) -> serde_json::Value {
    serde_json::json!({
        "backend": {
            "base_url": cfg.backend.base_url,
            "timeout_ms": cfg.backend.timeout_ms,
            "accept_invalid_certs": cfg.backend.accept_invalid_certs,
        },
        "assistant": {
            "api_base": cfg.assistant.api_base,
            "api_key_set": !cfg.assistant.api_key.is_empty(),
            "model": cfg.assistant.model,
            "system_prompt": cfg.assistant.system_prompt,
        },
        "store": {
            "wal_mode": cfg.store.wal_mode,
            "pool_size": cfg.store.pool_size,
            "integrity_check_on_startup": cfg.store.integrity_check_on_startup,
        },
        "polling": {
            "interval_secs": cfg.polling.interval_secs,
        },
        "logging": {
            "level": cfg.logging.level,
            "json_output": cfg.logging.json_output,
        },
        "notifications": {
            "enabled": cfg.notifications.enabled,
            "notify_job_events": cfg.notifications.notify_job_events,
            "notify_session_expired": cfg.notifications.notify_session_expired,
        },
    })
}

pub async fn run(config: ConfigHandle, action: SettingsAction, format: OutputFormat) -> OdResult<()> {
    match action {
        SettingsAction::Show | SettingsAction::List => {
            let cfg = config.read().await;
            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&settings_json(&cfg)).unwrap_or_default());
                }
                OutputFormat::Text => {
                    print_settings_text(&cfg);
                }
            }
        }
        SettingsAction::Get { key } => {
            let cfg = config.read().await;
            match get_setting_value(&cfg, &key) {
                Some(value) => match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::json!({ "key": key, "value": value }));
                    }
                    OutputFormat::Text => {
                        println!("{} = {}", key, value);
                    }
                },
                None => {
                    println!(
                        "{} Unknown setting key: {}",
                        style("ERROR").red().bold(),
                        key
                    );
                    println!("  Use `opsdeck settings list` to see available keys.");
                }
            }
        }
        SettingsAction::Set { key, value } => {
            {
                let mut cfg = config.write().await;
                match set_setting_value(&mut cfg, &key, &value) {
                    Ok(()) => {}
                    Err(e) => {
                        println!(
                            "{} Failed to set {}: {}",
                            style("ERROR").red().bold(),
                            key,
                            e
                        );
                        return Ok(());
                    }
                }
            }
            config.save().await?;

            match format {
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "key": key, "value": value, "saved": true }));
                }
                OutputFormat::Text => {
                    println!("{} {} = {}", style("SET").green().bold(), key, value);
                }
            }
        }
        SettingsAction::SetUrl { url } => {
            let sanitized = AppConfig::sanitize_base_url(&url);
            {
                let mut cfg = config.write().await;
                cfg.backend.base_url = sanitized.clone();
            }
            config.save().await?;
            println!(
                "{} Backend base URL set to: {}",
                style("SET").green().bold(),
                sanitized
            );
        }
        SettingsAction::SetApiKey { key } => {
            {
                let mut cfg = config.write().await;
                cfg.assistant.api_key = key;
            }
            config.save().await?;
            println!(
                "{} Completion API key updated.",
                style("SET").green().bold()
            );
        }
        SettingsAction::Export { path } => {
            let cfg = config.read().await;
            cfg.save_to_file(std::path::Path::new(&path))?;
            println!(
                "{} Settings exported to {}",
                style("OK").green().bold(),
                path
            );
        }
        SettingsAction::Import { path } => {
            let imported = AppConfig::load_from_file(std::path::Path::new(&path))?;
            {
                let mut cfg = config.write().await;
                *cfg = imported;
            }
            config.save().await?;
            println!(
                "{} Settings imported from {} and saved.",
                style("OK").green().bold(),
                path
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_masks_api_key() {
        let mut cfg = AppConfig::default();
        cfg.assistant.api_key = "sk-secret".to_string();
        assert_eq!(
            get_setting_value(&cfg, "assistant.api_key").as_deref(),
            Some("********")
        );
    }

    #[test]
    fn set_sanitizes_backend_url() {
        let mut cfg = AppConfig::default();
        set_setting_value(&mut cfg, "backend.base_url", "api.example.com/").unwrap();
        assert_eq!(cfg.backend.base_url, "https://api.example.com");
    }

    #[test]
    fn set_clamps_poll_interval() {
        let mut cfg = AppConfig::default();
        set_setting_value(&mut cfg, "polling.interval_secs", "0").unwrap();
        assert_eq!(cfg.polling.interval_secs, 1);
    }

    #[test]
    fn set_rejects_unknown_key_and_bad_level() {
        let mut cfg = AppConfig::default();
        assert!(set_setting_value(&mut cfg, "nope.nope", "1").is_err());
        assert!(set_setting_value(&mut cfg, "logging.level", "loud").is_err());
    }
}
