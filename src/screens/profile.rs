use iced::widget::container::bordered_box;
use iced::widget::image::Handle;
use iced::widget::{button, column, horizontal_space, image, pick_list, row, text, text_input, Column, Container, Row, Scrollable, Stack};
use iced::{Alignment, Center, ContentFit, Element, Length};
use iced_aw::date_picker;
use iced_font_awesome::fa_icon_solid;
use crate::app::state::{Field, GENDERS, ROLE_LABEL};
use crate::app::{App, Message};
use crate::screens::nav_menu::icon_button_content;

fn avatar_widget(app: &App) -> Element<'_, Message> {
    // a freshly picked file wins over the stored avatar
    let data = app
        .uploaded_file
        .as_ref()
        .map(|f| f.bytes.clone())
        .or_else(|| app.avatar_data.clone());
    match data {
        Some(data) => image(Handle::from_bytes(data))
            .width(Length::Fixed(220.0))
            .height(Length::Fixed(220.0))
            .content_fit(ContentFit::Cover)
            .into(),
        None => Container::new(fa_icon_solid("user").style(move |_| text::base(&app.theme)))
            .center_x(Length::Fixed(220.0))
            .center_y(Length::Fixed(220.0))
            .style(move |_| bordered_box(&app.theme))
            .into(),
    }
}

fn field_row<'a>(label: impl ToString, value: impl Into<Element<'a, Message>>) -> Row<'a, Message> {
    row![
        text(label.to_string()).size(20).width(Length::Fixed(200.0)),
        value.into(),
    ]
        .spacing(20)
        .align_y(Center)
}

fn read_only(app: &App, field: Field) -> Element<'_, Message> {
    let value = match field {
        Field::City => app.selected_city().map(|c| c.name.as_str()),
        Field::Wards => app.selected_district().map(|d| d.name.as_str()),
        _ => None,
    }
        .unwrap_or_else(|| app.form.get(field));
    text(value).size(20).into()
}

fn editor(app: &App, field: Field) -> Element<'_, Message> {
    match field {
        Field::Gender => pick_list(
            GENDERS.map(String::from).to_vec(),
            app.form.gender.clone(),
            Message::GenderSelected,
        )
            .placeholder("Chọn giới tính")
            .width(Length::Fill)
            .into(),
        Field::Birthdate => {
            let but = button(fa_icon_solid("calendar-days").style(move |_| text::base(&app.theme)))
                .on_press(Message::ChooseDate);
            row![
                text_input("yyyy-mm-dd", app.form.get(field))
                    .on_input(move |v| Message::FieldChanged(field, v))
                    .padding(10)
                    .size(18)
                    .width(Length::Fill),
                date_picker(app.show_picker, app.picker_date(), but, Message::CancelDate, Message::SubmitDate),
            ]
                .spacing(10)
                .align_y(Center)
                .into()
        }
        Field::City => pick_list(app.cities.clone(), app.selected_city().cloned(), Message::CitySelected)
            .placeholder("Chọn tỉnh/thành phố")
            .width(Length::Fill)
            .into(),
        Field::Wards => pick_list(app.districts_for_city(), app.selected_district().cloned(), Message::DistrictSelected)
            .placeholder("Chọn quận/huyện")
            .width(Length::Fill)
            .into(),
        Field::Fullname | Field::Phone => text_input(&field.to_string(), app.form.get(field))
            .on_input(move |v| Message::FieldChanged(field, v))
            .padding(10)
            .size(18)
            .width(Length::Fill)
            .into(),
    }
}

fn error_lines(app: &App) -> Column<'_, Message> {
    let mut lines = Column::new().spacing(5);
    if let Some(err) = &app.validation_error {
        lines = lines.push(text(err.to_string()).size(18).style(text::danger));
    }
    if let Some(err) = &app.submit_error {
        lines = lines.push(text(format!("Cập nhật thất bại: {err}")).size(16).style(text::danger));
    }
    if !app.error_message.is_empty() {
        lines = lines.push(text(&app.error_message).size(16).style(text::danger));
    }
    for (fetch, err) in &app.load_errors {
        lines = lines.push(text(format!("Không tải được {fetch}: {err}")).size(14).style(text::danger));
    }
    lines
}

fn courses_list(app: &App) -> Column<'_, Message> {
    let header = text("Khóa học").size(22);
    if app.form.course_list.is_empty() {
        return column![header, text("Chưa có khóa học").size(16)].spacing(10);
    }
    app.form
        .course_list
        .iter()
        .fold(column![header].spacing(10), |col, course| {
            col.push(text(format!("• {course}")).size(18))
        })
}

fn action_button(app: &App) -> Element<'_, Message> {
    if app.is_editing() {
        let label = if app.saving { "Đang lưu..." } else { "Lưu" };
        button(icon_button_content(
            fa_icon_solid("floppy-disk").style(move |_| text::base(&app.theme)),
            label,
        ))
            .on_press_maybe((!app.saving).then_some(Message::SavePressed))
            .padding(10)
            .into()
    } else {
        button(icon_button_content(
            fa_icon_solid("pen-to-square").style(move |_| text::base(&app.theme)),
            "Chỉnh Sửa",
        ))
            .on_press(Message::StartEditing)
            .padding(10)
            .into()
    }
}

fn snackbar(app: &App) -> Element<'_, Message> {
    let toast = Container::new(
        row![
            text("Cập nhật thành công!").size(18).style(text::success),
            button("X").on_press(Message::CloseSnackbar),
        ]
            .spacing(20)
            .align_y(Center),
    )
        .padding(10)
        .style(move |_| bordered_box(&app.theme));
    Container::new(toast)
        .width(Length::Fill)
        .align_x(Center)
        .padding(10)
        .into()
}

fn profile_card(app: &App) -> Column<'_, Message> {
    let mut header = column![
        avatar_widget(app),
        text(app.form.fullname.clone().unwrap_or_default()).size(28),
        text(ROLE_LABEL).size(18),
    ]
        .spacing(10)
        .align_x(Center);
    if app.is_editing() {
        header = header.push(button("Chọn ảnh đại diện").on_press(Message::ChooseAvatar));
    }

    let fields = [Field::Fullname, Field::Gender, Field::Birthdate, Field::Phone, Field::City, Field::Wards]
        .into_iter()
        .fold(Column::new().spacing(15), |col, field| {
            let value = if app.is_editing() { editor(app, field) } else { read_only(app, field) };
            col.push(field_row(field, value))
        })
        .push(field_row("Email", text(app.form.email.clone().unwrap_or_default()).size(20)))
        .push(field_row("Lớp", text(app.form.class_id.clone().unwrap_or_default()).size(20)));

    let info = Container::new(
        column![
            fields,
            row![horizontal_space(), action_button(app), horizontal_space()],
        ]
            .spacing(30)
            .padding(30),
    )
        .style(move |_| bordered_box(&app.theme))
        .width(Length::Fill);

    column![
        header,
        error_lines(app),
        info,
        Container::new(courses_list(app))
            .style(move |_| bordered_box(&app.theme))
            .width(Length::Fill)
            .padding(20),
    ]
        .spacing(20)
        .align_x(Alignment::Center)
}

pub fn profile_screen(app: &App) -> Container<Message> {
    let content: Element<Message> = match &app.session {
        Err(err) => column![
            text("Không thể mở hồ sơ").size(28),
            text(err).size(18).style(text::danger),
        ]
            .spacing(15)
            .into(),
        Ok(_) => Scrollable::new(profile_card(app)).height(Length::Fill).into(),
    };

    let mut ui_stack = Stack::new().push(
        Container::new(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .padding(20),
    );
    if app.show_snackbar {
        ui_stack = ui_stack.push(snackbar(app));
    }

    Container::new(ui_stack)
        .width(Length::Fill)
        .height(Length::Fill)
}
