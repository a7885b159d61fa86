//! Whole-frame scenarios driven through [`Ui`], the way a host would.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use trellis_core::{Bounds, LayoutParameters, Orientation, Vec2};
use trellis_ui::input::KeybindType;
use trellis_ui::render::MonospaceFont;
use trellis_ui::view::handle;
use trellis_ui::widget::{Image, KeybindEditor, Lane, PaginatedMenu, Spacer};
use trellis_ui::{
    Button, Font, InputState, KeybindList, RenderCommand, Sprite, Texture, Ui, UiConfig, UiRenderer,
    ViewHandle,
};

const CONFIG: &str = r#"
[input]
repeat_interval_ms = 100
initial_delay_ms = 200

[overlay]
dimming = 0.6

[animation]
hover_scale = 1.25
hover_duration_ms = 100
"#;

const WHITE: Texture = Texture::new(0, 1, 1);

fn new_ui() -> Ui {
    let config = UiConfig::from_toml_str(CONFIG).expect("valid config");
    let placeholder = handle(Spacer::new(LayoutParameters::fixed_size(0.0, 0.0)));
    Ui::new(placeholder, Bounds::new(0.0, 0.0, 320.0, 240.0), config)
}

fn frame(
    ui: &mut Ui,
    input: &mut InputState,
    elapsed: Duration,
    change: impl FnOnce(&mut InputState),
) {
    input.begin_frame();
    change(input);
    ui.update(elapsed, input);
}

#[test]
fn test_keybind_editor_round_trip_through_overlay() {
    let mut ui = new_ui();
    let font: Rc<dyn Font> = Rc::new(MonospaceFont::default());

    let image = Rc::new(RefCell::new(Image::new(Some(Sprite::new(Texture::new(1, 10, 10))))));
    let _hover = ui.hover_scale(&image);
    let editor = KeybindEditor::new(font, ui.overlays(), ui.resolver())
        .with_keybind_list(KeybindList::of_buttons([Button::F5]))
        .with_keybind_type(KeybindType::SingleKeybind)
        .with_dimming(ui.config().overlay.dimming);
    let changed = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&changed);
    editor.on_change(move |list| *sink.borrow_mut() = Some(list.to_string()));

    let image_view: ViewHandle = image.clone();
    ui.set_root(handle(
        Lane::new(Orientation::Vertical).with_children(vec![image_view, handle(editor)]),
    ));
    let mut renderer = UiRenderer::new();
    ui.draw(&mut renderer, WHITE);
    let mut input = InputState::new();

    // Hovering the image scales it up with the configured tween, leaving scales it back.
    ui.pointer_move(Vec2::new(200.0, 200.0), Vec2::new(5.0, 5.0));
    frame(&mut ui, &mut input, Duration::from_millis(100), |_| {});
    assert!((image.borrow().scale() - 1.25).abs() < 1e-3);
    ui.pointer_move(Vec2::new(5.0, 5.0), Vec2::new(200.0, 200.0));
    frame(&mut ui, &mut input, Duration::from_millis(100), |_| {});
    assert!((image.borrow().scale() - 1.0).abs() < 1e-3);

    // The editor sits below the 10px image.
    renderer.begin_frame();
    ui.draw(&mut renderer, WHITE);
    assert!(ui.click(Vec2::new(2.0, 12.0), Button::MouseLeft));
    assert_eq!(ui.overlays().len(), 1);

    renderer.begin_frame();
    ui.draw(&mut renderer, WHITE);
    let dimmed = renderer.commands().iter().any(|command| {
        matches!(command, RenderCommand::Texture { texture, tint, .. }
            if *texture == WHITE && (tint.a - 0.6).abs() < 1e-3)
    });
    assert!(dimmed);
    assert!(!renderer.vertices().is_empty());

    frame(&mut ui, &mut input, Duration::from_millis(16), |input| {
        input.press(Button::LeftShift);
        input.press(Button::F1);
    });
    assert!(ui.is_capturing_input());
    frame(&mut ui, &mut input, Duration::from_millis(16), |input| {
        input.release(Button::F1);
        input.release(Button::LeftShift);
    });
    assert!(ui.overlays().is_empty());
    assert!(!ui.is_capturing_input());
    assert_eq!(changed.borrow().as_deref(), Some("LeftShift + F1"));
}

#[test]
fn test_paginated_menu_arrows_through_ui() {
    let mut ui = new_ui();
    let arrow = Sprite::new(Texture::new(2, 10, 10));
    let pages = (0..3)
        .map(|_| handle(Spacer::new(LayoutParameters::fixed_size(50.0, 30.0))))
        .collect();
    let menu = PaginatedMenu::new(Orientation::Horizontal, arrow, arrow).with_pages(pages);
    let page = Rc::new(Cell::new(0));
    let seen = Rc::clone(&page);
    menu.on_page_change(move |index| seen.set(index));
    ui.set_root(handle(menu));

    let mut renderer = UiRenderer::new();
    for expected in [1, 2] {
        renderer.begin_frame();
        ui.draw(&mut renderer, WHITE);
        assert!(ui.click(Vec2::new(65.0, 15.0), Button::MouseLeft));
        assert_eq!(page.get(), expected);
    }

    // Last page: the next arrow is hidden, the previous arrow works.
    renderer.begin_frame();
    ui.draw(&mut renderer, WHITE);
    assert!(!ui.click(Vec2::new(65.0, 15.0), Button::MouseLeft));
    assert!(ui.click(Vec2::new(5.0, 15.0), Button::MouseLeft));
    assert_eq!(page.get(), 1);
}

#[test]
fn test_actions_repeat_with_configured_timing() {
    let ui = new_ui();
    let mut actions = ui.action_state::<&str>();
    actions.bind(Button::Down, "down").expect("first binding");
    assert!(actions.bind(Button::Down, "again").is_err());

    let mut input = InputState::new();
    input.press(Button::Down);
    let mut fired = Vec::new();
    for elapsed in [0, 100, 100, 50, 50] {
        actions.tick(Duration::from_millis(elapsed), &mut input);
        fired.push(!actions.current_actions().is_empty());
    }
    assert_eq!(fired, [true, false, true, false, true]);
    assert!(input.is_suppressed(Button::Down));
}
