use std::collections::BTreeMap;
use std::fmt;
use iced::Theme;
use iced_aw::date_picker::Date;
use chrono::Datelike;
use crate::api::{AvatarUpload, Course, District, EduClient, Province, TutorProfile, TutorUpdate};
use crate::config::Config;
use crate::session::Session;
use crate::validate::{format_birthdate, parse_birthdate, ValidationError};

pub const ROLE_LABEL: &str = "giáo viên";
pub const GENDERS: [&str; 3] = ["Nam", "Nữ", "Khác"];

pub struct App {
    pub config: Config,
    pub theme: Theme,
    pub current_screen: Screen,
    pub client: Option<EduClient>,
    pub session: Result<Session, String>,
    //
    pub form: ProfileForm,
    pub cities: Vec<Province>,
    pub districts: Vec<District>,
    pub edit_mode: EditMode,
    pub uploaded_file: Option<AvatarUpload>,
    pub avatar_data: Option<Vec<u8>>,
    pub show_picker: bool,
    //
    pub validation_error: Option<ValidationError>,
    pub submit_error: Option<String>,
    pub error_message: String,
    pub load_errors: BTreeMap<Fetch, String>,
    pub saving: bool,
    //
    pub show_snackbar: bool,
    pub snackbar_ticket: u64,
    // latest request ticket per fetch; older responses are dropped
    pub tickets: BTreeMap<Fetch, u64>,
}

impl App {
    pub fn new(config: Config, session: Result<Session, String>, client: Result<EduClient, String>) -> Self {
        let (client, error_message) = match client {
            Ok(client) => (Some(client), String::new()),
            Err(e) => (None, e),
        };
        let form = ProfileForm {
            email: session.as_ref().ok().map(|s| s.email.clone()),
            ..ProfileForm::default()
        };
        Self {
            theme: config.theme(),
            config,
            current_screen: Screen::default(),
            client,
            session,
            form,
            cities: vec![],
            districts: vec![],
            edit_mode: EditMode::default(),
            uploaded_file: None,
            avatar_data: None,
            show_picker: false,
            validation_error: None,
            submit_error: None,
            error_message,
            load_errors: BTreeMap::new(),
            saving: false,
            show_snackbar: false,
            snackbar_ticket: 0,
            tickets: BTreeMap::new(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.edit_mode == EditMode::Editing
    }

    pub fn selected_city(&self) -> Option<&Province> {
        let city = self.form.city.as_deref()?;
        self.cities
            .iter()
            .find(|p| p.code.to_string() == city || p.name == city)
    }

    pub fn selected_district(&self) -> Option<&District> {
        let wards = self.form.wards.as_deref()?;
        self.districts
            .iter()
            .find(|d| d.code.to_string() == wards || d.name == wards)
    }

    /// Districts of the selected province, or all of them before one is chosen.
    pub fn districts_for_city(&self) -> Vec<District> {
        match self.selected_city() {
            Some(city) => self
                .districts
                .iter()
                .filter(|d| d.province_code == city.code)
                .cloned()
                .collect(),
            None => self.districts.clone(),
        }
    }

    pub fn picker_date(&self) -> Date {
        self.form
            .birthdate
            .as_deref()
            .and_then(parse_birthdate)
            .map(|d| Date::from_ymd(d.year(), d.month(), d.day()))
            .unwrap_or_else(Date::today)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileForm {
    pub fullname: Option<String>,
    pub gender: Option<String>,
    pub birthdate: Option<String>,
    pub phone: Option<String>,
    pub city: Option<String>,
    pub wards: Option<String>,
    pub class_id: Option<String>,
    pub avt: Option<String>,
    pub email: Option<String>,
    pub course_list: Vec<Course>,
}

impl ProfileForm {
    /// Replaces the profile fields with a fresh response. The email stays the
    /// session's and the course list is owned by its own fetch.
    pub fn apply_profile(&mut self, profile: TutorProfile) {
        self.fullname = profile.fullname;
        self.gender = profile.gender;
        self.birthdate = profile.birthdate;
        self.phone = profile.phone;
        self.city = profile.city;
        self.wards = profile.wards;
        self.class_id = profile.class_id;
        self.avt = profile.avt;
    }

    pub fn set(&mut self, field: Field, value: String) {
        let slot = match field {
            Field::Fullname => &mut self.fullname,
            Field::Gender => &mut self.gender,
            Field::Birthdate => &mut self.birthdate,
            Field::Phone => &mut self.phone,
            Field::City => &mut self.city,
            Field::Wards => &mut self.wards,
        };
        *slot = Some(value);
    }

    pub fn get(&self, field: Field) -> &str {
        let value = match field {
            Field::Fullname => &self.fullname,
            Field::Gender => &self.gender,
            Field::Birthdate => &self.birthdate,
            Field::Phone => &self.phone,
            Field::City => &self.city,
            Field::Wards => &self.wards,
        };
        value.as_deref().unwrap_or_default()
    }

    pub fn to_update(&self, tutor_id: &str, file: Option<AvatarUpload>) -> TutorUpdate {
        let birthdate = self.get(Field::Birthdate);
        TutorUpdate {
            fullname: self.get(Field::Fullname).to_string(),
            tutor_id: tutor_id.to_string(),
            gender: self.get(Field::Gender).to_string(),
            birthdate: format_birthdate(birthdate).unwrap_or_else(|| birthdate.to_string()),
            phone: self.get(Field::Phone).to_string(),
            city: self.get(Field::City).to_string(),
            wards: self.get(Field::Wards).to_string(),
            file,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Fullname,
    Gender,
    Birthdate,
    Phone,
    City,
    Wards,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Field::Fullname => "Họ và tên",
            Field::Gender => "Giới tính",
            Field::Birthdate => "Ngày sinh",
            Field::Phone => "Số điện thoại",
            Field::City => "Tỉnh/Thành phố",
            Field::Wards => "Quận/Huyện",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Fetch {
    Profile,
    Courses,
    Provinces,
    Districts,
    Avatar,
}

impl fmt::Display for Fetch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Fetch::Profile => "hồ sơ",
            Fetch::Courses => "khóa học",
            Fetch::Provinces => "tỉnh/thành phố",
            Fetch::Districts => "quận/huyện",
            Fetch::Avatar => "ảnh đại diện",
        };
        write!(f, "{label}")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    Viewing,
    Editing,
}

#[derive(PartialEq, Default)]
pub enum Screen {
    #[default]
    Profile,
    Settings,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app_with_places() -> App {
        let mut app = App::new(Config::default(), Err("no token".into()), Err("offline".into()));
        app.cities = vec![
            Province { name: "Hà Nội".into(), code: 1 },
            Province { name: "Hà Giang".into(), code: 2 },
        ];
        app.districts = vec![
            District { name: "Ba Đình".into(), code: 1, province_code: 1 },
            District { name: "Hoàn Kiếm".into(), code: 2, province_code: 1 },
            District { name: "Đồng Văn".into(), code: 26, province_code: 2 },
        ];
        app
    }

    #[test]
    fn districts_follow_selected_city() {
        let mut app = app_with_places();
        assert_eq!(app.districts_for_city().len(), 3);

        app.form.city = Some("2".into());
        let districts = app.districts_for_city();
        assert_eq!(districts.len(), 1);
        assert_eq!(districts[0].name, "Đồng Văn");
    }

    #[test]
    fn selection_matches_code_or_name() {
        let mut app = app_with_places();
        app.form.city = Some("Hà Nội".into());
        app.form.wards = Some("2".into());
        assert_eq!(app.selected_city().map(|c| c.code), Some(1));
        assert_eq!(app.selected_district().map(|d| d.name.as_str()), Some("Hoàn Kiếm"));
    }

    #[test]
    fn profile_refresh_keeps_email_and_courses() {
        let mut form = ProfileForm {
            email: Some("t@e.vn".into()),
            course_list: vec![Course { id: Some("1".into()), name: None }],
            ..ProfileForm::default()
        };
        form.apply_profile(TutorProfile { fullname: Some("B".into()), ..TutorProfile::default() });
        assert_eq!(form.fullname.as_deref(), Some("B"));
        assert_eq!(form.email.as_deref(), Some("t@e.vn"));
        assert_eq!(form.course_list.len(), 1);
    }

    #[test]
    fn update_body_reformats_birthdate() {
        let form = ProfileForm {
            fullname: Some("A".into()),
            birthdate: Some("2000-01-31".into()),
            ..ProfileForm::default()
        };
        let update = form.to_update("9", None);
        assert_eq!(update.birthdate, "2000/01/31");
        assert_eq!(update.tutor_id, "9");
        assert_eq!(update.phone, "");
    }

    #[test]
    fn picker_starts_at_loaded_birthdate() {
        let mut app = app_with_places();
        app.form.birthdate = Some("1995-07-04".into());
        let date = app.picker_date();
        assert_eq!((date.year, date.month, date.day), (1995, 7, 4));
    }
}
