use super::row::{LineRow, LineRows};
use super::sync::synchronize;
use crate::domain::a001_vehicle::choice::VehicleChoice;
use crate::shared::icons::icon;
use contracts::shared::line_pricing::MAX_QUANTITY;
use leptos::prelude::*;
use thaw::*;

/// Таблица строк документа.
///
/// Строки рендерятся по ключу: новая строка получает обработчики в момент
/// создания, уже показанные строки не пересоздаются.
#[component]
pub fn LinesTable(
    rows: LineRows,
    choices: Callback<String, Vec<VehicleChoice>>,
    #[prop(into)] readonly: Signal<bool>,
) -> impl IntoView {
    let on_remove = Callback::new(move |key: usize| rows.remove(key));

    view! {
        <div class="sale-lines">
            <Table attr:style="width: 100%;">
                <TableHeader>
                    <TableRow>
                        <TableHeaderCell resizable=false min_width=280.0>"Автомобиль"</TableHeaderCell>
                        <TableHeaderCell resizable=false min_width=90.0>"Количество"</TableHeaderCell>
                        <TableHeaderCell resizable=false min_width=120.0>"Цена"</TableHeaderCell>
                        <TableHeaderCell resizable=false min_width=120.0>"Сумма"</TableHeaderCell>
                        <TableHeaderCell resizable=false min_width=50.0>""</TableHeaderCell>
                    </TableRow>
                </TableHeader>
                <TableBody>
                    <For
                        each=move || rows.rows.get()
                        key=|row| row.key
                        children=move |row| {
                            view! {
                                <LineRowView row=row choices=choices readonly=readonly on_remove=on_remove />
                            }
                        }
                    />
                </TableBody>
            </Table>

            <div class="add-row">
                <Button
                    appearance=ButtonAppearance::Secondary
                    on_click=move |_| {
                        rows.push_empty();
                    }
                    disabled=readonly
                >
                    {icon("plus")}
                    " Добавить строку"
                </Button>
            </div>
        </div>
    }
}

#[component]
fn LineRowView(
    row: LineRow,
    choices: Callback<String, Vec<VehicleChoice>>,
    readonly: Signal<bool>,
    on_remove: Callback<usize>,
) -> impl IntoView {
    let key = row.key;

    view! {
        <TableRow class="sale-line">
            <TableCell>
                <select
                    name=format!("lines-{}-vehicle", key)
                    prop:value=move || row.vehicle_id.get()
                    disabled=move || readonly.get()
                    on:change=move |ev| {
                        row.vehicle_id.set(event_target_value(&ev));
                        synchronize(row);
                    }
                >
                    <option value="">"-- выберите автомобиль --"</option>
                    {move || {
                        let current = row.vehicle_id.get();
                        choices
                            .run(current.clone())
                            .into_iter()
                            .map(|choice| {
                                let selected = choice.id == current;
                                view! {
                                    <option value=choice.id selected=selected>{choice.label}</option>
                                }
                            })
                            .collect_view()
                    }}
                </select>
            </TableCell>
            <TableCell>
                <input
                    type="number"
                    min="1"
                    max=MAX_QUANTITY.to_string()
                    step="1"
                    name=format!("lines-{}-quantity", key)
                    prop:value=move || row.quantity.get()
                    disabled=move || readonly.get()
                    on:change=move |ev| {
                        row.quantity.set(event_target_value(&ev));
                        synchronize(row);
                    }
                />
            </TableCell>
            <TableCell>
                <input
                    type="text"
                    readonly=true
                    name=format!("lines-{}-unit_price", key)
                    prop:value=move || row.unit_price.get()
                />
            </TableCell>
            <TableCell>
                <input
                    type="text"
                    readonly=true
                    name=format!("lines-{}-subtotal", key)
                    prop:value=move || row.subtotal.get()
                />
            </TableCell>
            <TableCell>
                <Button
                    appearance=ButtonAppearance::Subtle
                    on_click=move |_| on_remove.run(key)
                    disabled=readonly
                >
                    {icon("trash")}
                </Button>
            </TableCell>
        </TableRow>
    }
}
