use iced::widget::image::{Handle, Image};
use iced::widget::{button, column, container, row, text, Column};
use iced::{Element, Length};

use crate::restore::codec::DownloadFormat;
use crate::Message;

/// One image pane: a title and either the image or a placeholder line
fn pane(
    title: &'static str,
    handle: Option<&Handle>,
    placeholder: &'static str,
) -> Column<'static, Message> {
    let body: Element<'static, Message> = match handle {
        Some(handle) => Image::new(handle.clone())
            .width(Length::Fill)
            .height(Length::Fill)
            .into(),
        None => text(placeholder).size(16).into(),
    };

    column![
        text(title).size(20),
        container(body)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill),
    ]
    .spacing(10)
    .height(Length::Fill)
}

/// The original photo with the Open action
pub fn source_pane(handle: Option<&Handle>, in_flight: bool) -> Element<'static, Message> {
    column![
        pane("Original", handle, "No photo loaded yet"),
        button(text("Open photo..."))
            .on_press_maybe((!in_flight).then_some(Message::OpenFile))
            .width(Length::Fill)
            .padding(10),
    ]
    .spacing(10)
    .width(Length::Fill)
    .into()
}

/// The restored result with the save actions
pub fn restored_pane(handle: Option<&Handle>, in_flight: bool) -> Element<'static, Message> {
    let placeholder = if in_flight {
        "Restoring, please wait..."
    } else {
        "The restored photo will appear here"
    };

    let mut content = column![pane("Restored", handle, placeholder)]
        .spacing(10)
        .width(Length::Fill);

    if handle.is_some() {
        content = content.push(
            row![
                button(text("Save PNG"))
                    .on_press(Message::Download(DownloadFormat::Png))
                    .width(Length::Fill)
                    .padding(10),
                button(text("Save JPEG"))
                    .on_press(Message::Download(DownloadFormat::Jpeg))
                    .width(Length::Fill)
                    .padding(10),
            ]
            .spacing(10),
        );
    }

    content.into()
}
