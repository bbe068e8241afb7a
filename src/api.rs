use std::fmt;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, Request, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("URL parse error: {0}")]
    UrlParseError(#[from] url::ParseError),
    #[error("HTTP Error: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
    #[error("server answered {status} for {url}")]
    Status { status: StatusCode, url: Url },
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Keeps a JSON scalar as text; the backend is loose about strings vs numbers.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(scalar_text))
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TutorProfile {
    #[serde(default, deserialize_with = "string_or_number")]
    pub fullname: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub gender: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub birthdate: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub phone: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub wards: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub class_id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub avt: Option<String>,
}

/// Course entries come in several key spellings, sometimes more than one at once.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(from = "Map<String, Value>")]
pub struct Course {
    pub id: Option<String>,
    pub name: Option<String>,
}

impl From<Map<String, Value>> for Course {
    fn from(mut fields: Map<String, Value>) -> Self {
        // first spelling holding a usable scalar wins
        let mut pick = |keys: &[&str]| {
            keys.iter()
                .find_map(|key| fields.remove(*key).and_then(scalar_text))
        };
        let id = pick(&["id", "courseId", "courseid"]);
        let name = pick(&["name", "courseName", "coursename", "title"]);
        Course { id, name }
    }
}

impl fmt::Display for Course {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.name, &self.id) {
            (Some(name), _) => write!(f, "{name}"),
            (None, Some(id)) => write!(f, "#{id}"),
            (None, None) => write!(f, "-"),
        }
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Province {
    pub name: String,
    pub code: u32,
}

impl fmt::Display for Province {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct District {
    pub name: String,
    pub code: u32,
    pub province_code: u32,
}

impl fmt::Display for District {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AvatarUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// Body of `PUT UpdateTutor`. `birthdate` is already in `yyyy/MM/dd`.
#[derive(Debug, Clone, PartialEq)]
pub struct TutorUpdate {
    pub fullname: String,
    pub tutor_id: String,
    pub gender: String,
    pub birthdate: String,
    pub phone: String,
    pub city: String,
    pub wards: String,
    pub file: Option<AvatarUpload>,
}

impl TutorUpdate {
    fn into_form(self) -> Result<Form, ApiError> {
        let form = Form::new()
            .text("fullname", self.fullname)
            .text("tutorid", self.tutor_id)
            .text("gender", self.gender)
            .text("birthdate", self.birthdate)
            .text("phone", self.phone)
            .text("city", self.city)
            .text("wards", self.wards);
        Ok(match self.file {
            Some(file) => {
                let mime = image::guess_format(&file.bytes)
                    .map(|f| f.to_mime_type())
                    .unwrap_or("application/octet-stream");
                let part = Part::bytes(file.bytes)
                    .file_name(file.file_name)
                    .mime_str(mime)?;
                form.part("file", part)
            }
            None => form,
        })
    }
}

#[derive(Clone, Debug)]
pub struct EduClient {
    client: Client,
    api_base: Url,
    provinces_base: Url,
}

impl EduClient {
    pub fn new(api_base_url: &str, provinces_base_url: &str) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(concat!("tutor-profile/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(EduClient {
            client,
            api_base: Self::base(api_base_url)?,
            provinces_base: Self::base(provinces_base_url)?,
        })
    }

    // joining onto a base without a trailing slash would drop its last segment
    fn base(raw: &str) -> Result<Url, url::ParseError> {
        let mut url = Url::parse(raw)?;
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, ApiError> {
        info!("GET {}", url);
        let request = Request::new(Method::GET, url);
        let response = self.client.execute(request).await?;
        if !response.status().is_success() {
            return Err(ApiError::Status { status: response.status(), url: response.url().clone() });
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub async fn view_tutor(&self, tutor_id: &str) -> Result<TutorProfile, ApiError> {
        let mut url = self.api_base.join("viewTutor")?;
        url.query_pairs_mut().append_pair("tutorId", tutor_id);
        self.get_json(url).await
    }

    pub async fn tutor_courses(&self, tutor_id: &str) -> Result<Vec<Course>, ApiError> {
        let mut url = self.api_base.join("tutor/course")?;
        url.query_pairs_mut().append_pair("tutorid", tutor_id);
        self.get_json(url).await
    }

    pub async fn provinces(&self) -> Result<Vec<Province>, ApiError> {
        self.get_json(self.provinces_base.join("p/")?).await
    }

    pub async fn districts(&self) -> Result<Vec<District>, ApiError> {
        self.get_json(self.provinces_base.join("d/")?).await
    }

    pub async fn update_tutor(&self, update: TutorUpdate) -> Result<(), ApiError> {
        let url = self.api_base.join("UpdateTutor")?;
        info!("PUT {} (avatar attached: {})", url, update.file.is_some());
        let response = self
            .client
            .put(url)
            .multipart(update.into_form()?)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(ApiError::Status { status: response.status(), url: response.url().clone() });
        }
        Ok(())
    }

    /// Downloads the stored avatar when `avt` is an absolute http(s) URL.
    pub async fn avatar(&self, avt: &str) -> Result<Option<Vec<u8>>, ApiError> {
        let url = match Url::parse(avt) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => url,
            _ => return Ok(None),
        };
        info!("GET {}", url);
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            return Err(ApiError::Status { status: response.status(), url: response.url().clone() });
        }
        Ok(Some(response.bytes().await?.to_vec()))
    }
}
