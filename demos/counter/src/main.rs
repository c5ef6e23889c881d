use std::rc::Rc;

use elevate_core::prelude::*;
use elevate_devtools::Inspector;

#[derive(Clone, Debug, PartialEq)]
enum Element {
    Text(String),
    Button { label: String },
    Column(Vec<Element>),
}

struct Counter {
    class: Rc<ComponentClass<Element>>,
    count: StateField<i32>,
    step: PropField<i32>,
}

impl Counter {
    fn define() -> Result<Self> {
        let mut b = ComponentClass::builder("Counter");
        let count = b.state("count", 0)?;
        let step = b.prop("step", Some(1))?;
        b.prop::<String>("title", Some("Counter".into()))?;
        b.children_where("buttons", |n| matches!(n, Element::Button { .. }))?;
        b.on_before_update(|_, _, next| {
            // odd counts are committed but not shown
            if next.get_as::<i32>("count").unwrap_or_default() % 2 == 0 {
                UpdateGate::Proceed
            } else {
                UpdateGate::Skip
            }
        });
        b.render_with("CounterView", counter_view)?;
        Ok(Self {
            class: b.build(),
            count,
            step,
        })
    }

    fn increment(&self, c: &Component<Element>) {
        let step = self.step.get_or(c, 1);
        self.count.update(c, |n| n + step);
    }
}

fn counter_view(vm: &dyn ViewModel) -> Element {
    let title = vm.field::<String>("title").unwrap_or_default();
    let count = vm.field::<i32>("count").unwrap_or_default();
    let mut rows = vec![Element::Text(format!("{title}: {count}"))];
    rows.extend(vm.field::<Vec<Element>>("buttons").unwrap_or_default());
    Element::Column(rows)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let counter = Counter::define()?;
    let host = Host::new();
    let c = host.mount(
        &counter.class,
        Props::new().with("title", "Clicks".to_string()),
        Children::many([
            Element::Button {
                label: "+".into(),
            },
            Element::Text("ignored".into()),
        ]),
    );

    let mut inspector = Inspector::new();
    for round in 1..=3 {
        counter.increment(&c);
        log::info!(
            "round {round}: count = {} (container still {:?})",
            counter.count.get(&c),
            c.state().get_as::<i32>("count")
        );
        host.flush();
        println!("{:?}", c.rendered());
        inspector.frame(&c);
    }

    host.receive_props(&c, Props::new().with("step", 10), Children::Empty);
    host.flush();
    counter.increment(&c);
    host.flush();
    println!("{}", inspector.table(&c));

    let view = counter
        .class
        .static_render("CounterView")
        .ok_or_else(|| anyhow::anyhow!("CounterView not bound"))?;
    println!(
        "{:?}",
        view(&FieldMap::new().with("title", "Preview".to_string()).with("count", 99))
    );
    Ok(())
}
