use std::fs;
use std::time::Duration;
use chrono::Local;
use iced::Task;
use tokio::task;
use tracing::{debug, error, info, warn};
use crate::api::{AvatarUpload, EduClient};
use crate::app::state::{EditMode, Fetch, Screen};
use crate::config::{save_config, theme_from_str, Config};
use crate::session::Session;
use crate::validate::validate_profile;
use super::{App, Message};

const SNACKBAR_TIMEOUT: Duration = Duration::from_secs(3);

impl App {
    pub fn boot(
        config: Config,
        session: Result<Session, String>,
        client: Result<EduClient, String>,
    ) -> (Self, Task<Message>) {
        let mut app = App::new(config, session, client);
        let task = app.load();
        (app, task)
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Reload => self.load(),
            Message::ProfileLoaded(ticket, result) => {
                let Some(profile) = self.settle(Fetch::Profile, ticket, result) else {
                    return Task::none();
                };
                self.form.apply_profile(profile);
                debug!("profile loaded for {:?}", self.form.email);
                self.load_avatar()
            }
            Message::CoursesLoaded(ticket, result) => {
                if let Some(courses) = self.settle(Fetch::Courses, ticket, result) {
                    self.form.course_list = courses;
                }
                Task::none()
            }
            Message::ProvincesLoaded(ticket, result) => {
                if let Some(cities) = self.settle(Fetch::Provinces, ticket, result) {
                    self.cities = cities;
                }
                Task::none()
            }
            Message::DistrictsLoaded(ticket, result) => {
                if let Some(districts) = self.settle(Fetch::Districts, ticket, result) {
                    self.districts = districts;
                }
                Task::none()
            }
            Message::AvatarLoaded(ticket, result) => {
                if let Some(data) = self.settle(Fetch::Avatar, ticket, result) {
                    self.avatar_data = data;
                }
                Task::none()
            }
            Message::StartEditing => {
                self.edit_mode = EditMode::Editing;
                self.submit_error = None;
                debug!("entered edit mode");
                Task::none()
            }
            Message::FieldChanged(field, value) => {
                if self.is_editing() {
                    self.form.set(field, value);
                }
                Task::none()
            }
            Message::GenderSelected(gender) => {
                if self.is_editing() {
                    self.form.gender = Some(gender);
                }
                Task::none()
            }
            Message::CitySelected(city) => {
                if !self.is_editing() {
                    return Task::none();
                }
                let keeps_district = self
                    .selected_district()
                    .is_some_and(|d| d.province_code == city.code);
                self.form.city = Some(city.code.to_string());
                if !keeps_district {
                    self.form.wards = Some(String::new());
                }
                Task::none()
            }
            Message::DistrictSelected(district) => {
                if self.is_editing() {
                    self.form.wards = Some(district.code.to_string());
                }
                Task::none()
            }
            Message::ChooseDate => {
                self.show_picker = self.is_editing();
                Task::none()
            }
            Message::SubmitDate(date) => {
                self.form.birthdate = Some(format!("{:04}-{:02}-{:02}", date.year, date.month, date.day));
                self.show_picker = false;
                Task::none()
            }
            Message::CancelDate => {
                self.show_picker = false;
                Task::none()
            }
            Message::ChooseAvatar => {
                if !self.is_editing() {
                    return Task::none();
                }
                Task::perform(
                    async move {
                        task::spawn_blocking(pick_avatar)
                            .await
                            .unwrap_or_else(|join_err| Err(format!("Lỗi khi chọn ảnh đại diện: {join_err}")))
                    },
                    Message::AvatarChosen,
                )
            }
            Message::AvatarChosen(result) => {
                match result {
                    Ok(Some(file)) => {
                        info!("avatar selected: {} ({} bytes)", file.file_name, file.bytes.len());
                        self.uploaded_file = Some(file);
                        self.error_message.clear();
                    }
                    Ok(None) => debug!("avatar selection cancelled"),
                    Err(e) => {
                        error!("avatar selection failed: {e}");
                        self.error_message = e;
                    }
                }
                Task::none()
            }
            Message::SavePressed => self.save(),
            Message::Saved(result) => {
                self.saving = false;
                match result {
                    Ok(()) => {
                        info!("profile saved");
                        self.edit_mode = EditMode::Viewing;
                        self.uploaded_file = None;
                        self.validation_error = None;
                        self.submit_error = None;
                        self.show_snackbar = true;
                        self.snackbar_ticket += 1;
                        let ticket = self.snackbar_ticket;
                        Task::batch([
                            self.load_profile(),
                            self.load_courses(),
                            Task::perform(
                                async move { tokio::time::sleep(SNACKBAR_TIMEOUT).await },
                                move |_| Message::SnackbarExpired(ticket),
                            ),
                        ])
                    }
                    Err(e) => {
                        error!("profile update failed: {e}");
                        self.submit_error = Some(e);
                        Task::none()
                    }
                }
            }
            Message::CloseSnackbar => {
                self.show_snackbar = false;
                Task::none()
            }
            Message::SnackbarExpired(ticket) => {
                if ticket == self.snackbar_ticket {
                    self.show_snackbar = false;
                }
                Task::none()
            }
            Message::GoToProfile => {
                self.current_screen = Screen::Profile;
                Task::none()
            }
            Message::GoToSettings => {
                self.current_screen = Screen::Settings;
                Task::none()
            }
            Message::ThemeSelected(name) => {
                if let Some(theme) = theme_from_str(name) {
                    self.config.theme_name = name.to_string();
                    if let Err(e) = save_config(&self.config) {
                        warn!("could not persist theme: {e}");
                    }
                    self.theme = theme;
                }
                Task::none()
            }
        }
    }

    /// Validates, then submits; mode changes wait for the server's answer.
    fn save(&mut self) -> Task<Message> {
        if self.saving || !self.is_editing() {
            return Task::none();
        }
        if let Err(e) = validate_profile(&self.form, Local::now()) {
            debug!("validation failed: {e}");
            self.validation_error = Some(e);
            return Task::none();
        }
        self.validation_error = None;

        let Some((client, tutor_id)) = self.request_context() else {
            let reason = match &self.session {
                Err(e) => e.clone(),
                Ok(_) => self.error_message.clone(),
            };
            self.submit_error = Some(reason);
            return Task::none();
        };
        let update = self.form.to_update(&tutor_id, self.uploaded_file.clone());
        self.saving = true;
        self.submit_error = None;
        Task::perform(
            async move { client.update_tutor(update).await.map_err(|e| e.to_string()) },
            Message::Saved,
        )
    }

    pub fn load(&mut self) -> Task<Message> {
        Task::batch([
            self.load_profile(),
            self.load_courses(),
            self.load_provinces(),
            self.load_districts(),
        ])
    }

    fn ticket(&mut self, fetch: Fetch) -> u64 {
        let ticket = self.tickets.entry(fetch).or_default();
        *ticket += 1;
        *ticket
    }

    // client and tutor id, or None when there is nothing to ask for
    fn request_context(&self) -> Option<(EduClient, String)> {
        let client = self.client.clone()?;
        let session = self.session.as_ref().ok()?;
        Some((client, session.tutor_id.clone()))
    }

    fn settle<T>(&mut self, fetch: Fetch, ticket: u64, result: Result<T, String>) -> Option<T> {
        if self.tickets.get(&fetch) != Some(&ticket) {
            debug!("dropping stale {fetch:?} response #{ticket}");
            return None;
        }
        match result {
            Ok(value) => {
                self.load_errors.remove(&fetch);
                Some(value)
            }
            Err(e) => {
                error!("failed to load {fetch:?}: {e}");
                self.load_errors.insert(fetch, e);
                None
            }
        }
    }

    fn load_profile(&mut self) -> Task<Message> {
        let Some((client, tutor_id)) = self.request_context() else {
            return Task::none();
        };
        let ticket = self.ticket(Fetch::Profile);
        Task::perform(
            async move { client.view_tutor(&tutor_id).await.map_err(|e| e.to_string()) },
            move |result| Message::ProfileLoaded(ticket, result),
        )
    }

    fn load_courses(&mut self) -> Task<Message> {
        let Some((client, tutor_id)) = self.request_context() else {
            return Task::none();
        };
        let ticket = self.ticket(Fetch::Courses);
        Task::perform(
            async move { client.tutor_courses(&tutor_id).await.map_err(|e| e.to_string()) },
            move |result| Message::CoursesLoaded(ticket, result),
        )
    }

    fn load_provinces(&mut self) -> Task<Message> {
        let Some((client, _)) = self.request_context() else {
            return Task::none();
        };
        let ticket = self.ticket(Fetch::Provinces);
        Task::perform(
            async move { client.provinces().await.map_err(|e| e.to_string()) },
            move |result| Message::ProvincesLoaded(ticket, result),
        )
    }

    fn load_districts(&mut self) -> Task<Message> {
        let Some((client, _)) = self.request_context() else {
            return Task::none();
        };
        let ticket = self.ticket(Fetch::Districts);
        Task::perform(
            async move { client.districts().await.map_err(|e| e.to_string()) },
            move |result| Message::DistrictsLoaded(ticket, result),
        )
    }

    // always takes a ticket so an older download cannot land after this
    fn load_avatar(&mut self) -> Task<Message> {
        let ticket = self.ticket(Fetch::Avatar);
        let remote = self
            .form
            .avt
            .clone()
            .filter(|avt| avt.starts_with("http://") || avt.starts_with("https://"));
        let (Some(client), Some(avt)) = (self.client.clone(), remote) else {
            self.avatar_data = None;
            self.load_errors.remove(&Fetch::Avatar);
            return Task::none();
        };
        Task::perform(
            async move { client.avatar(&avt).await.map_err(|e| e.to_string()) },
            move |result| Message::AvatarLoaded(ticket, result),
        )
    }
}

fn pick_avatar() -> Result<Option<AvatarUpload>, String> {
    let Some(path_buf) = rfd::FileDialog::new()
        .add_filter("Image", &["png", "jpg", "jpeg"])
        .pick_file()
    else {
        return Ok(None);
    };
    let bytes = fs::read(&path_buf).map_err(|err| format!("Không đọc được tệp ảnh: {err}"))?;
    image::load_from_memory(&bytes).map_err(|err| format!("Tệp không phải ảnh hợp lệ: {err}"))?;
    let file_name = path_buf
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "avatar".to_string());
    Ok(Some(AvatarUpload { file_name, bytes }))
}
