use super::view_model::SaleDetailsViewModel;
use crate::domain::a002_sale::ui::lines::LinesTable;
use crate::shared::date_utils::format_date;
use crate::shared::icons::icon;
use contracts::domain::a002_sale::aggregate::SaleStatus;
use leptos::prelude::*;
use std::rc::Rc;
use thaw::*;

#[component]
pub fn SaleDetails(id: Option<String>, on_saved: Rc<dyn Fn(String)>) -> impl IntoView {
    let vm = SaleDetailsViewModel::new();
    vm.load_vehicles();
    vm.load_if_needed(id);

    let readonly = Signal::derive(move || vm.is_cancelled() || vm.busy.get());
    let choices = Callback::new(move |current: String| vm.vehicle_choices(&current));

    view! {
        <div class="details-container sale-details">
            <div class="details-header">
                <h3>
                    {move || match vm.code.get() {
                        Some(code) => format!("Продажа {} от {}", code, format_date(&vm.sale_date.get())),
                        None => "Новая продажа".to_string(),
                    }}
                </h3>
                {move || vm.is_edit_mode().then(|| {
                    let status = vm.status.get();
                    let class = match status {
                        SaleStatus::Active => "badge badge--success",
                        SaleStatus::Pending => "badge badge--warning",
                        SaleStatus::Cancelled => "badge badge--secondary",
                    };
                    view! { <span class=class>{status.label()}</span> }
                })}
            </div>

            {move || vm.error.get().map(|e| view! { <div class="error">{e}</div> })}
            {move || vm.info.get().map(|m| view! { <div class="info">{m}</div> })}

            <div class="details-form">
                <div class="form-group">
                    <label for="customer_name">{"Клиент"}</label>
                    <input
                        type="text"
                        id="customer_name"
                        prop:value=move || vm.customer_name.get()
                        disabled=move || readonly.get()
                        on:input=move |ev| vm.customer_name.set(event_target_value(&ev))
                        placeholder="ФИО клиента"
                    />
                </div>

                <div class="form-group">
                    <label for="sale_date">{"Дата продажи"}</label>
                    <input
                        type="date"
                        id="sale_date"
                        prop:value=move || vm.sale_date.get()
                        disabled=move || readonly.get()
                        on:input=move |ev| vm.sale_date.set(event_target_value(&ev))
                    />
                </div>

                <div class="form-group">
                    <label for="status">{"Статус"}</label>
                    <select
                        id="status"
                        disabled=move || readonly.get()
                        on:change=move |ev| {
                            if let Some(status) = SaleStatus::from_storage(&event_target_value(&ev)) {
                                vm.status.set(status);
                            }
                        }
                    >
                        {[SaleStatus::Active, SaleStatus::Pending]
                            .into_iter()
                            .map(|s| view! {
                                <option value=s.as_str() selected=move || vm.status.get() == s>{s.label()}</option>
                            })
                            .collect_view()}
                    </select>
                </div>

                <div class="form-group">
                    <label for="discount">{"Скидка"}</label>
                    <input
                        type="number"
                        id="discount"
                        min="0"
                        step="0.01"
                        prop:value=move || vm.discount.get()
                        disabled=move || readonly.get()
                        on:input=move |ev| vm.discount.set(event_target_value(&ev))
                    />
                </div>

                <div class="form-group">
                    <label for="comment">{"Комментарий"}</label>
                    <textarea
                        id="comment"
                        prop:value=move || vm.comment.get()
                        disabled=move || readonly.get()
                        on:input=move |ev| vm.comment.set(event_target_value(&ev))
                        rows="2"
                    />
                </div>
            </div>

            <LinesTable rows=vm.lines choices=choices readonly=readonly />

            <div class="sale-total">
                <span>{"Итого: "}</span>
                <strong>{move || vm.total_preview()}</strong>
            </div>

            <div class="details-actions">
                <button
                    class="btn btn-primary"
                    on:click={
                        let on_saved = on_saved.clone();
                        move |_| vm.save_command(on_saved.clone())
                    }
                    disabled=move || readonly.get()
                >
                    {icon("save")}
                    {move || if vm.is_edit_mode() { " Сохранить" } else { " Создать" }}
                </button>
                {move || vm.can_cancel().then(|| view! {
                    <Button
                        appearance=ButtonAppearance::Secondary
                        on_click=move |_| vm.cancel_command()
                        disabled=Signal::derive(move || vm.busy.get())
                    >
                        {icon("x-circle")}
                        " Отменить продажу"
                    </Button>
                })}
            </div>
        </div>
    }
}
