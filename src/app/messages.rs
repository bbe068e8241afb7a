use iced_aw::date_picker::Date;
use crate::api::{AvatarUpload, Course, District, Province, TutorProfile};
use crate::app::state::Field;

#[derive(Debug, Clone)]
pub enum Message {
    Reload,
    ProfileLoaded(u64, Result<TutorProfile, String>),
    CoursesLoaded(u64, Result<Vec<Course>, String>),
    ProvincesLoaded(u64, Result<Vec<Province>, String>),
    DistrictsLoaded(u64, Result<Vec<District>, String>),
    AvatarLoaded(u64, Result<Option<Vec<u8>>, String>),
    //
    StartEditing,
    FieldChanged(Field, String),
    GenderSelected(String),
    CitySelected(Province),
    DistrictSelected(District),
    //
    ChooseDate,
    SubmitDate(Date),
    CancelDate,
    //
    ChooseAvatar,
    // None when the dialog was dismissed
    AvatarChosen(Result<Option<AvatarUpload>, String>),
    //
    SavePressed,
    Saved(Result<(), String>),
    CloseSnackbar,
    SnackbarExpired(u64),
    //
    GoToProfile,
    GoToSettings,
    ThemeSelected(&'static str),
}
