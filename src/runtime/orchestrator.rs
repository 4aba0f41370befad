use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use crate::{
    config::AppConfig,
    messenger::{ChatPlatform, ChatTarget, InboundEvent, KeyboardOption, UserKey},
    platform::{extract_video_link, DownloadedFile, MediaExtractor, PlatformError},
    service::{FormatDescriptor, ServiceRegistry},
    storage::MemoryCache,
    utils::{remove_dir_if_empty, remove_file_quietly},
};

use super::task::{LinkOutcome, SelectionOutcome, SelectionPayload, Stage, MAX_CALLBACK_PAYLOAD_BYTES};

#[derive(Clone, Debug)]
pub struct OrchestratorSettings {
    pub domains: Vec<String>,
    pub scratch_dir: PathBuf,
}

impl OrchestratorSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            domains: config.download.domains.clone(),
            scratch_dir: config.download.dir.clone(),
        }
    }
}

/// Drives one user request from link to delivered file, independently of the backend.
///
/// Link flow: fetching, then offering a menu of formats. Button flow: downloading,
/// delivering, cleanup. Each flow ends with exactly one terminal message to the user.
pub struct DeliveryOrchestrator {
    platform: Arc<dyn ChatPlatform>,
    extractor: Arc<dyn MediaExtractor>,
    services: ServiceRegistry,
    settings: OrchestratorSettings,
    /// Users with a download running; their scratch directory is busy until it finishes.
    in_flight: MemoryCache<UserKey, ()>,
}

impl DeliveryOrchestrator {
    pub fn new(
        platform: Arc<dyn ChatPlatform>,
        extractor: Arc<dyn MediaExtractor>,
        services: ServiceRegistry,
        settings: OrchestratorSettings,
    ) -> Self {
        info!("Delivery orchestrator ready on {}", platform.name());
        Self {
            platform,
            extractor,
            services,
            settings,
            in_flight: MemoryCache::new(64),
        }
    }

    pub async fn handle_event(&self, event: InboundEvent) {
        match event {
            InboundEvent::Started { target, first_name, .. } => {
                self.notify(&target, &greeting(first_name.as_deref())).await;
            }
            InboundEvent::Command {
                target,
                command,
                first_name,
                ..
            } => {
                let reply = match command.as_str() {
                    "start" => greeting(first_name.as_deref()),
                    "help" => t!("commands.help").to_string(),
                    _ => t!("commands.unknown").to_string(),
                };
                self.notify(&target, &reply).await;
            }
            InboundEvent::Text { user, target, text } => {
                let outcome = self.handle_link(user, &target, &text).await;
                debug!("Link from {} ended as {:?}", user, outcome);
            }
            InboundEvent::Callback {
                user,
                target,
                callback_id,
                payload,
            } => {
                let outcome = self.handle_selection(user, &target, &callback_id, &payload).await;
                info!("Selection from {} ended as {:?}", user, outcome);
            }
        }
    }

    pub async fn handle_link(&self, user: UserKey, target: &ChatTarget, text: &str) -> LinkOutcome {
        let Some(url) = extract_video_link(text, &self.settings.domains) else {
            return LinkOutcome::Ignored;
        };

        if let Some(wait) = self.services.ratelimit.check(user) {
            info!("User {} is cooling down for {} more minutes", user, wait.minutes());
            self.notify(target, &t!("messages.rate_limited", minutes = wait)).await;
            return LinkOutcome::RateLimited(wait);
        }

        trace_stage(user, Stage::Fetching);
        self.notify(target, &t!("messages.looking_up")).await;

        let catalog = match self.services.catalog.fetch(&url).await {
            Ok(catalog) => catalog,
            Err(e) => {
                error!("Failed to fetch formats for {}: {}", url, e);
                self.notify(target, &t!("messages.fetch_failed")).await;
                return LinkOutcome::ExtractionFailed;
            }
        };

        let options = self.build_options(&url, &catalog.formats);
        if options.is_empty() {
            self.notify(target, &t!("messages.no_formats")).await;
            return LinkOutcome::NoUsableFormats;
        }

        trace_stage(user, Stage::Offering);
        self.services.ratelimit.mark(user);

        let header = match catalog.thumbnail {
            Some(_) => t!("messages.choose_format_for", title = catalog.title),
            None => t!("messages.choose_format", title = catalog.title),
        };

        if let Err(e) = self.platform.send_keyboard(target, &header, &options).await {
            error!("Failed to send format menu to {}: {}", user, e);
            for option in &options {
                if let Some(payload) = SelectionPayload::parse(&option.payload) {
                    self.services.selection.remove(&payload.token);
                }
            }
            return LinkOutcome::MenuFailed;
        }

        LinkOutcome::Offered { options: options.len() }
    }

    /// One token per button, so each press is independent of the others.
    fn build_options(&self, url: &str, formats: &[FormatDescriptor]) -> Vec<KeyboardOption> {
        let mut options = Vec::with_capacity(formats.len());

        for format in formats {
            let token = self.services.selection.put(url);
            let payload = SelectionPayload::new(token.as_str(), format.format_id.as_str()).encode();

            if payload.len() > MAX_CALLBACK_PAYLOAD_BYTES {
                warn!("Skipping format {}: button payload too long", format.format_id);
                self.services.selection.remove(&token);
                continue;
            }

            options.push(KeyboardOption {
                text: format.label(),
                payload,
            });
        }

        options
    }

    pub async fn handle_selection(
        &self,
        user: UserKey,
        target: &ChatTarget,
        callback_id: &str,
        payload: &str,
    ) -> SelectionOutcome {
        let Some(selection) = SelectionPayload::parse(payload) else {
            warn!("Malformed button payload from {}: {:?}", user, payload);
            self.ack(callback_id, None).await;
            self.notify(target, &t!("callbacks.malformed")).await;
            return SelectionOutcome::Malformed;
        };

        let Some(url) = self.services.selection.resolve(&selection.token) else {
            self.ack(callback_id, None).await;
            self.notify(target, &t!("callbacks.resend_link")).await;
            return SelectionOutcome::UnknownToken;
        };

        // files are named after the title, so two formats of one video share a path
        let Some(_slot) = self.begin_download(user) else {
            info!("User {} already has a download running", user);
            self.ack(callback_id, None).await;
            self.notify(target, &t!("callbacks.busy")).await;
            return SelectionOutcome::Busy;
        };

        self.ack(callback_id, Some(&t!("callbacks.download_started"))).await;

        trace_stage(user, Stage::Downloading);
        self.notify(target, &t!("messages.downloading")).await;

        let user_dir = self.settings.scratch_dir.join(user.to_string());
        let file = match self.download(&url, &selection.format_id, &user_dir).await {
            Ok(file) => file,
            Err(e) => {
                error!("Download of {} [{}] failed: {}", url, selection.format_id, e);
                self.notify(target, &t!("messages.download_failed")).await;
                self.services.selection.remove(&selection.token);
                remove_dir_if_empty(&user_dir).await;
                return SelectionOutcome::DownloadFailed;
            }
        };

        trace_stage(user, Stage::Delivering);
        let caption = t!("messages.delivered", file_name = file.file_name());
        let outcome = match self.platform.send_file(target, &file.path, file.kind, &caption).await {
            Ok(()) => SelectionOutcome::Delivered,
            Err(e) => {
                error!("Failed to deliver {} to {}: {}", file.path.display(), user, e);
                self.notify(target, &t!("messages.delivery_failed")).await;
                SelectionOutcome::DeliveryFailed
            }
        };

        trace_stage(user, Stage::Cleanup);
        self.cleanup(&file, &selection.token).await;

        outcome
    }

    fn begin_download(&self, user: UserKey) -> Option<DownloadSlot<'_>> {
        self.in_flight.set_if_absent(user, ()).then(|| DownloadSlot {
            in_flight: &self.in_flight,
            user,
        })
    }

    async fn download(&self, url: &str, format_id: &str, user_dir: &Path) -> Result<DownloadedFile, PlatformError> {
        tokio::fs::create_dir_all(user_dir).await?;
        self.extractor.download(url, format_id, user_dir).await
    }

    async fn cleanup(&self, file: &DownloadedFile, token: &str) {
        remove_file_quietly(&file.path).await;
        if let Some(dir) = file.path.parent() {
            remove_dir_if_empty(dir).await;
        }
        self.services.selection.remove(token);
    }

    /// Best effort; a failed notice never aborts the flow.
    async fn notify(&self, target: &ChatTarget, text: &str) {
        if let Err(e) = self.platform.send_text(target, text).await {
            warn!("Failed to send message via {}: {}", self.platform.name(), e);
        }
    }

    async fn ack(&self, callback_id: &str, notification: Option<&str>) {
        if let Err(e) = self.platform.answer_callback(callback_id, notification).await {
            warn!("Failed to answer callback {}: {}", callback_id, e);
        }
    }
}

/// Releases the user's download slot on every exit path.
struct DownloadSlot<'a> {
    in_flight: &'a MemoryCache<UserKey, ()>,
    user: UserKey,
}

impl Drop for DownloadSlot<'_> {
    fn drop(&mut self) {
        self.in_flight.del(&self.user);
    }
}

fn greeting(first_name: Option<&str>) -> String {
    match first_name.filter(|name| !name.is_empty()) {
        Some(name) => t!("commands.start", first_name = name).to_string(),
        None => t!("commands.start_anonymous").to_string(),
    }
}

fn trace_stage(user: UserKey, stage: Stage) {
    debug!("User {} -> {}", user, stage);
}
