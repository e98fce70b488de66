use iced::widget::image::Handle;
use iced::widget::{column, container, row, text};
use iced::{Element, Length, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;
use tracing::{error, info, warn};

mod config;
mod restore;
mod state;
mod ui;

use config::CONFIG;
use restore::client::{self, RestoreError};
use restore::codec::{self, CodecError, DownloadFormat};
use state::options::{Gender, MainRequest};
use state::session::{RequestState, Session, SourceImage};

/// Main application state
struct PhotoRestore {
    /// All workflow state: options, photo, result, request lifecycle
    session: Session,
    /// Render handle for the loaded photo, rebuilt when it changes
    source_handle: Option<Handle>,
    /// Render handle for the restored result
    restored_handle: Option<Handle>,
    /// Status message to display to the user
    status: String,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked "Open photo"
    OpenFile,
    /// Background photo load finished
    SourceLoaded(Result<SourceImage, CodecError>),
    MainRequestPicked(MainRequest),
    GenderPicked(Gender),
    AgeChanged(String),
    KeepIdToggled(bool),
    RemakeHairToggled(bool),
    RemakeClothesToggled(bool),
    AdditionalChanged(String),
    /// User clicked "Restore photo"
    Generate,
    /// The remote call finished; the token identifies which generation
    GenerationFinished(u64, Result<Vec<u8>, RestoreError>),
    /// User picked an export format
    Download(DownloadFormat),
    DownloadFinished(Result<PathBuf, CodecError>),
    /// User clicked "Clear & reset"
    Reset,
}

impl PhotoRestore {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        info!(model = %CONFIG.gemini_image_model, "photo restore initialized");

        (
            PhotoRestore {
                session: Session::new(),
                source_handle: None,
                restored_handle: None,
                status: String::from("Ready. Open an old photo to begin."),
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::OpenFile => {
                // Show the native file picker dialog
                let picked = FileDialog::new()
                    .set_title("Select a photo to restore")
                    .add_filter("Images", &codec::SUPPORTED_EXTENSIONS)
                    .pick_file();

                if let Some(path) = picked {
                    self.status = format!("Loading {}...", path.display());
                    return Task::perform(codec::load_source(path), Message::SourceLoaded);
                }

                Task::none()
            }
            Message::SourceLoaded(Ok(source)) => {
                info!(
                    file = %source.file_name(),
                    mime = %source.mime_type,
                    bytes = source.bytes.len(),
                    "photo loaded"
                );
                self.source_handle = Some(Handle::from_bytes(source.bytes.clone()));
                self.restored_handle = None;
                self.status = format!(
                    "✅ Loaded {} ({} KB)",
                    source.file_name(),
                    source.bytes.len() / 1024
                );
                self.session.set_source(source);
                Task::none()
            }
            Message::SourceLoaded(Err(err)) => {
                // The previously loaded photo, if any, stays usable
                warn!(%err, "failed to load photo");
                self.session.fail_upload(err.to_string());
                self.status = String::from("❌ Could not load the photo.");
                Task::none()
            }
            Message::MainRequestPicked(choice) => {
                self.session.options.main_request = choice;
                Task::none()
            }
            Message::GenderPicked(gender) => {
                self.session.options.gender = gender;
                Task::none()
            }
            Message::AgeChanged(age) => {
                self.session.options.age = age;
                Task::none()
            }
            Message::KeepIdToggled(value) => {
                self.session.options.keep_id = value;
                Task::none()
            }
            Message::RemakeHairToggled(value) => {
                self.session.options.remake_hair = value;
                Task::none()
            }
            Message::RemakeClothesToggled(value) => {
                self.session.options.remake_clothes = value;
                Task::none()
            }
            Message::AdditionalChanged(request) => {
                self.session.options.additional_request = request;
                Task::none()
            }
            Message::Generate => {
                // The session guard enforces "one request in flight" and
                // "no generation without a photo"
                let Some((token, source, options)) = self.session.begin_generation() else {
                    return Task::none();
                };

                self.restored_handle = None;
                self.status = String::from("Sending the photo to the restoration model...");
                info!(token, "starting restoration");

                Task::perform(
                    async move { client::restore_photo(&source, &options).await },
                    move |result| Message::GenerationFinished(token, result),
                )
            }
            Message::GenerationFinished(token, result) => {
                match &result {
                    Ok(bytes) => info!(token, bytes = bytes.len(), "restoration succeeded"),
                    Err(err @ RestoreError::NoImage(_)) => {
                        warn!(token, %err, "service answered without an image")
                    }
                    Err(err) => error!(token, %err, "restoration failed"),
                }

                let outcome = result.map_err(|err| err.to_string());
                if self.session.finish_generation(token, outcome) {
                    match &self.session.request {
                        RequestState::Succeeded => {
                            if let Some(bytes) = &self.session.restored {
                                self.restored_handle = Some(Handle::from_bytes(bytes.clone()));
                            }
                            self.status = String::from("✅ Restoration complete.");
                        }
                        RequestState::Failed(_) => {
                            self.status = String::from("❌ Restoration failed.");
                        }
                        _ => {}
                    }
                } else {
                    info!(token, "discarding completion from a superseded session");
                }
                Task::none()
            }
            Message::Download(format) => {
                let Some(png_bytes) = self.session.restored.clone() else {
                    return Task::none();
                };

                let picked = FileDialog::new()
                    .set_title("Save restored photo")
                    .set_file_name(format.file_name())
                    .save_file();

                if let Some(path) = picked {
                    self.status = format!("Saving {}...", path.display());
                    return Task::perform(
                        codec::export(path, png_bytes, format),
                        Message::DownloadFinished,
                    );
                }

                Task::none()
            }
            Message::DownloadFinished(Ok(path)) => {
                info!(path = %path.display(), "saved restored photo");
                self.status = format!("✅ Saved {}", path.display());
                Task::none()
            }
            Message::DownloadFinished(Err(err)) => {
                warn!(%err, "export failed");
                self.status = format!("❌ {}", err);
                Task::none()
            }
            Message::Reset => {
                self.session.reset();
                self.source_handle = None;
                self.restored_handle = None;
                self.status = String::from("Ready. Open an old photo to begin.");
                Task::none()
            }
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        let in_flight = self.session.is_in_flight();

        let controls = container(ui::controls::control_panel(
            &self.session.options,
            self.session.can_generate(),
            in_flight,
        ))
        .width(Length::Fixed(340.0));

        let panes = row![
            controls,
            ui::display::source_pane(self.source_handle.as_ref(), in_flight),
            ui::display::restored_pane(self.restored_handle.as_ref(), in_flight),
        ]
        .spacing(20)
        .height(Length::Fill);

        let mut content = column![text("Old Photo Restoration").size(32), panes]
            .spacing(20)
            .padding(20);

        if let RequestState::Failed(message) = &self.session.request {
            content = content.push(text(message.clone()).style(text::danger).size(16));
        }

        content = content.push(text(&self.status).size(14));

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

fn init_logging() {
    let default_directives = format!(
        "{},wgpu_core=warn,wgpu_hal=warn,naga=warn,iced_wgpu=warn,reqwest=warn,hyper_util=warn",
        CONFIG.log_level
    );
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directives));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn main() -> iced::Result {
    dotenvy::dotenv().ok();
    init_logging();

    if CONFIG.gemini_api_key.trim().is_empty() {
        warn!("GEMINI_API_KEY is not set; restoration requests will fail until it is configured");
    }

    iced::application(
        "Photo Restore",
        PhotoRestore::update,
        PhotoRestore::view,
    )
    .theme(PhotoRestore::theme)
    .centered()
    .run_with(PhotoRestore::new)
}
