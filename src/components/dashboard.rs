//! Dashboard View

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::api::instance::InstanceQuery;
use crate::api::template::TemplateQuery;
use crate::context::AppContext;
use crate::store::{store_set_categories, use_app_store, ConsoleView, AppStateStoreFields};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Counters {
    categories: usize,
    items: usize,
    templates: usize,
    instances: usize,
}

#[component]
pub fn DashboardView() -> impl IntoView {
    let ctx = expect_context::<AppContext>();
    let store = use_app_store();
    let counters = RwSignal::new(None::<Counters>);

    spawn_local(async move {
        let api = ctx.api();
        let template_query = TemplateQuery::default();
        let instance_query = InstanceQuery::default();
        let (categories, templates, instances) = futures::join!(
            api.get_categories(),
            api.query_templates(&template_query),
            api.query_instances(&instance_query)
        );
        let mut totals = Counters::default();
        match categories {
            Ok(list) => {
                totals.categories = list.len();
                totals.items = list.iter().map(|c| c.items.len()).sum();
                store_set_categories(&store, list);
            }
            Err(e) => ctx.api_failed("加载配置类别", &e),
        }
        match templates {
            Ok(list) => totals.templates = list.len(),
            Err(e) => ctx.api_failed("加载模板", &e),
        }
        match instances {
            Ok(list) => totals.instances = list.len(),
            Err(e) => ctx.api_failed("加载实例", &e),
        }
        counters.set(Some(totals));
    });

    let card = move |label: &'static str, target: ConsoleView, value: fn(&Counters) -> usize| {
        view! {
            <div class="stat-card" on:click=move |_| store.active_view().set(target)>
                <div class="stat-value">
                    {move || counters.get().map(|c| value(&c).to_string()).unwrap_or_else(|| "-".to_string())}
                </div>
                <div class="stat-label">{label}</div>
            </div>
        }
    };

    view! {
        <div class="page dashboard-page">
            <h2>"仪表盘"</h2>
            <div class="stat-cards">
                {card("配置类别", ConsoleView::ConfigCategory, |c| c.categories)}
                {card("配置项", ConsoleView::ConfigItem, |c| c.items)}
                {card("结构模板", ConsoleView::Template, |c| c.templates)}
                {card("结构实例", ConsoleView::Instance, |c| c.instances)}
            </div>
        </div>
    }
}
