//! 挂件事件集成测试

mod common;

use std::rc::Rc;

use farmmind_translate::parsers::html::{get_node_attr, text_content};
use farmmind_translate::translation::{ApplyOutcome, MemoryStore, WidgetEvent};
use farmmind_translate::TranslationEngine;

use common::{engine_with, headless_config, translated_dictionary, widget_config, MockApi, Pages};

const PAGE_WITH_SWITCH: &str = "<html><body>\
    <header><button class=\"lang-switch\"><span id=\"switch-label\">EN</span></button></header>\
    <h1>  Welcome  </h1><p id=\"outside\">Market prices</p>\
    </body></html>";

async fn ready_engine(html: &str, api: &Rc<MockApi>) -> TranslationEngine {
    let engine = engine_with(html, api, Box::new(MemoryStore::new()), widget_config());
    engine.init().await.unwrap();
    engine
}

#[tokio::test]
async fn panel_opens_and_closes() {
    let api = Rc::new(MockApi::new());
    let engine = ready_engine(PAGE_WITH_SWITCH, &api).await;
    let widget = engine.widget().unwrap();
    let outside = engine.document().get_element_by_id("outside").unwrap();

    engine.handle_event(WidgetEvent::FabClicked).await.unwrap();
    assert!(widget.is_open());

    // 挂件内部的点击不会关闭面板
    engine
        .handle_event(WidgetEvent::DocumentClicked(widget.select.clone()))
        .await
        .unwrap();
    assert!(widget.is_open());

    engine
        .handle_event(WidgetEvent::DocumentClicked(outside.clone()))
        .await
        .unwrap();
    assert!(!widget.is_open());

    engine
        .handle_event(WidgetEvent::LangSwitchClicked)
        .await
        .unwrap();
    assert!(widget.is_open());

    engine
        .handle_event(WidgetEvent::KeyDown("Enter".to_string()))
        .await
        .unwrap();
    assert!(widget.is_open());
    engine
        .handle_event(WidgetEvent::KeyDown("Escape".to_string()))
        .await
        .unwrap();
    assert!(!widget.is_open());
}

#[tokio::test]
async fn clicks_on_lang_switch_keep_panel_open() {
    let api = Rc::new(MockApi::new());
    let engine = ready_engine(PAGE_WITH_SWITCH, &api).await;
    let widget = engine.widget().unwrap();

    engine.handle_event(WidgetEvent::FabClicked).await.unwrap();
    // `.lang-switch` 的内容在初始化时已被替换为语言缩写，点击按钮本身
    let switch = engine.document().elements_by_class("lang-switch")[0].clone();
    engine
        .handle_event(WidgetEvent::DocumentClicked(switch))
        .await
        .unwrap();
    assert!(widget.is_open());
}

#[tokio::test]
async fn apply_and_reset_buttons() {
    let api = Rc::new(translated_dictionary());
    let engine = ready_engine(PAGE_WITH_SWITCH, &api).await;
    let widget = engine.widget().unwrap();

    assert_eq!(widget.selected_language().as_deref(), Some("en"));
    engine
        .handle_event(WidgetEvent::SelectChanged("hi".to_string()))
        .await
        .unwrap();
    assert_eq!(widget.selected_language().as_deref(), Some("hi"));

    let outcome = engine
        .handle_event(WidgetEvent::ApplyClicked)
        .await
        .unwrap();
    assert!(matches!(outcome, Some(ApplyOutcome::Translated { .. })));
    assert_eq!(text_content(&widget.status), "Translated.");

    let html = engine.document().to_html().unwrap();
    assert!(html.contains("<h1>  स्वागत है  </h1>"));
    // 挂件自身的文字不会被翻译
    assert_eq!(text_content(&widget.apply), "Apply");
    assert_eq!(text_content(&widget.reset), "English");
    assert!(api.calls()[0]
        .texts
        .iter()
        .all(|text| text != "Apply" && text != "Translate" && text != "Language"));

    let outcome = engine
        .handle_event(WidgetEvent::ResetClicked)
        .await
        .unwrap();
    assert!(matches!(outcome, Some(ApplyOutcome::Restored { .. })));
    assert_eq!(text_content(&widget.status), "English restored.");
    assert_eq!(widget.selected_language().as_deref(), Some("en"));
    assert!(engine
        .document()
        .to_html()
        .unwrap()
        .contains("<h1>  Welcome  </h1>"));
}

#[tokio::test]
async fn applying_default_from_select_restores() {
    let api = Rc::new(translated_dictionary());
    let engine = ready_engine(PAGE_WITH_SWITCH, &api).await;

    engine
        .handle_event(WidgetEvent::SelectChanged("hi".to_string()))
        .await
        .unwrap();
    engine.handle_event(WidgetEvent::ApplyClicked).await.unwrap();
    engine
        .handle_event(WidgetEvent::SelectChanged("en".to_string()))
        .await
        .unwrap();
    let outcome = engine.handle_event(WidgetEvent::ApplyClicked).await.unwrap();

    assert!(matches!(outcome, Some(ApplyOutcome::Restored { .. })));
    assert_eq!(engine.current_language(), "en");
}

#[tokio::test]
async fn fetched_languages_fill_the_select() {
    let api = Rc::new(MockApi::new());
    api.set_languages(vec![("hi", "Hindi"), ("mr", "Marathi"), ("ta", "Tamil")]);
    let engine = ready_engine(Pages::welcome(), &api).await;
    let widget = engine.widget().unwrap();

    let html = engine.document().to_html().unwrap();
    assert!(html.contains("<option value=\"en\" selected=\"\">English</option>"));
    assert!(html.contains("<option value=\"ta\">Tamil</option>"));
    assert!(widget.select("mr"));
}

#[tokio::test]
async fn existing_widget_is_not_duplicated() {
    let api = Rc::new(MockApi::new());
    let engine = ready_engine(
        "<body><div id=\"fmTranslateWidget\">custom</div><p>Harvest now</p></body>",
        &api,
    )
    .await;

    assert!(engine.widget().is_none());
    assert_eq!(
        engine
            .document()
            .to_html()
            .unwrap()
            .matches("fmTranslateWidget")
            .count(),
        1
    );
    // 没有挂件时事件不做任何事
    assert_eq!(engine.handle_event(WidgetEvent::FabClicked).await.unwrap(), None);
}

#[tokio::test]
async fn headless_engine_builds_no_widget() {
    let api = Rc::new(MockApi::new());
    let engine = engine_with(
        PAGE_WITH_SWITCH,
        &api,
        Box::new(MemoryStore::new()),
        headless_config(),
    );
    engine.init().await.unwrap();

    assert!(engine.widget().is_none());
    let switch = engine.document().elements_by_class("lang-switch")[0].clone();
    assert_eq!(text_content(&switch), "EN");
    assert_eq!(get_node_attr(&switch, "type").as_deref(), Some("button"));
}

#[tokio::test]
async fn second_init_keeps_widget_handle() {
    let api = Rc::new(MockApi::new());
    let engine = ready_engine(PAGE_WITH_SWITCH, &api).await;
    let first = engine.widget().unwrap();

    assert!(engine.init().await.unwrap().is_none());

    let widget = engine.widget().unwrap();
    assert!(Rc::ptr_eq(&widget.root, &first.root));
    engine.handle_event(WidgetEvent::FabClicked).await.unwrap();
    assert!(first.is_open());
}
