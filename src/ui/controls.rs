use iced::widget::{button, checkbox, column, pick_list, radio, text, text_input, Column};
use iced::{Element, Length};

use crate::state::options::{Gender, MainRequest, RestorationOptions};
use crate::Message;

/// The left-hand control panel: restoration options plus the
/// Restore / Reset actions
pub fn control_panel(
    options: &RestorationOptions,
    can_generate: bool,
    in_flight: bool,
) -> Element<'_, Message> {
    let main_request: Column<'_, Message> = MainRequest::ALL.iter().fold(
        column![text("Main request").size(18)].spacing(8),
        |col, &choice| {
            col.push(radio(
                choice.to_string(),
                choice,
                Some(options.main_request),
                Message::MainRequestPicked,
            ))
        },
    );

    let subject = column![
        text("Subject").size(18),
        pick_list(
            &Gender::ALL[..],
            Some(options.gender),
            Message::GenderPicked
        )
        .width(Length::Fill),
        text_input("Approximate age, e.g. 25", &options.age)
            .on_input(Message::AgeChanged)
            .padding(8),
    ]
    .spacing(8);

    let advanced = column![
        text("Advanced").size(18),
        checkbox("Keep identifying marks", options.keep_id).on_toggle(Message::KeepIdToggled),
        checkbox("Recreate hair", options.remake_hair).on_toggle(Message::RemakeHairToggled),
        checkbox("Recreate clothing", options.remake_clothes)
            .on_toggle(Message::RemakeClothesToggled),
    ]
    .spacing(8);

    let extra = column![
        text("Additional instructions").size(18),
        text_input(
            "e.g. add a gentle smile, do NOT change the shirt color",
            &options.additional_request
        )
        .on_input(Message::AdditionalChanged)
        .padding(8),
    ]
    .spacing(8);

    let generate_label = if in_flight {
        "Restoring..."
    } else {
        "Restore photo"
    };

    column![
        main_request,
        subject,
        advanced,
        extra,
        button(text(generate_label))
            .on_press_maybe(can_generate.then_some(Message::Generate))
            .width(Length::Fill)
            .padding(10),
        // reset stays available during a restoration; the stale completion
        // is discarded by the session token
        button(text("Clear & reset"))
            .on_press(Message::Reset)
            .width(Length::Fill)
            .padding(10),
    ]
    .spacing(20)
    .into()
}
