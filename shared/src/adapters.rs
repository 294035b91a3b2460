//! Adapters from catalog rows to the storefront shapes

use crate::models::{
    Collection, Image, OptionValue, PriceRange, Product, ProductOption, ProductVariant, Producer,
    SelectedOption, Seo, StoreCollection, Wine, WineImage, WineVariant, WINE_TYPES,
};
use crate::types::{Money, DEFAULT_CURRENCY_CODE};

/// Fallback image dimension when a row does not record one
const DEFAULT_IMAGE_DIMENSION: i32 = 600;

fn adapt_image(image: &WineImage, wine_title: &str) -> Image {
    Image {
        url: image.url.clone(),
        alt_text: image
            .alt_text
            .clone()
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| wine_title.to_string()),
        width: image.width.unwrap_or(DEFAULT_IMAGE_DIMENSION),
        height: image.height.unwrap_or(DEFAULT_IMAGE_DIMENSION),
    }
}

fn single_value_option(id: &str, name: &str, value: Option<String>) -> ProductOption {
    ProductOption {
        id: id.to_string(),
        name: name.to_string(),
        values: value
            .filter(|v| !v.is_empty())
            .map(|v| {
                vec![OptionValue {
                    id: v.to_lowercase(),
                    name: v,
                }]
            })
            .unwrap_or_default(),
    }
}

/// Convert a wine with its variants, images and producer into a product.
/// Images are expected in display order; the first becomes the featured image.
pub fn adapt_wine_to_product(
    wine: &Wine,
    variants: &[WineVariant],
    images: &[WineImage],
    producer: Option<&Producer>,
) -> Product {
    let currency = if wine.currency_code.is_empty() {
        DEFAULT_CURRENCY_CODE
    } else {
        wine.currency_code.as_str()
    };
    let description = wine.description.clone().unwrap_or_default();
    let description_html = wine
        .description_html
        .clone()
        .filter(|h| !h.is_empty())
        .unwrap_or_else(|| description.clone());

    let featured_image = images
        .first()
        .map(|i| adapt_image(i, &wine.title))
        .unwrap_or_else(Image::empty);

    let vintage = wine.vintage.map(|v| v.to_string());

    let options = vec![
        single_value_option("wine-type", "Wine Type", wine.wine_type.clone()),
        single_value_option("vintage", "Vintage", vintage.clone()),
        single_value_option("region", "Region", wine.region.clone()),
    ];

    let tags: Vec<String> = [
        wine.wine_type.clone(),
        vintage,
        wine.region.clone(),
        producer.map(|p| p.name.clone()),
    ]
    .into_iter()
    .flatten()
    .chain(wine.grape_varieties.iter().cloned())
    .filter(|t| !t.is_empty())
    .collect();

    let variants = variants
        .iter()
        .map(|v| ProductVariant {
            id: v.id,
            title: v.title.clone(),
            available_for_sale: v.available_for_sale,
            selected_options: vec![
                SelectedOption {
                    name: "Size".to_string(),
                    value: v.bottle_size.clone(),
                },
                SelectedOption {
                    name: "Price".to_string(),
                    value: v.price.to_string(),
                },
            ],
            price: Money::new(v.price, currency),
        })
        .collect();

    Product {
        id: wine.id,
        title: wine.title.clone(),
        handle: wine.handle.clone(),
        category_id: wine.category_id,
        seo: Seo {
            title: wine.title.clone(),
            description: description.clone(),
        },
        description,
        description_html,
        vendor: producer.map(|p| p.name.clone()),
        featured_image,
        currency_code: currency.to_string(),
        price_range: PriceRange {
            min_variant_price: Money::new(wine.price_range_min, currency),
            max_variant_price: Money::new(wine.price_range_max, currency),
        },
        compare_at_price: wine.compare_at_price.map(|p| Money::new(p, currency)),
        options,
        tags,
        variants,
        images: images.iter().map(|i| adapt_image(i, &wine.title)).collect(),
        available_for_sale: wine.available_for_sale,
    }
}

/// Convert a collection row into the storefront collection
pub fn adapt_collection(collection: &Collection) -> StoreCollection {
    let description = collection.description.clone().unwrap_or_default();
    StoreCollection {
        handle: collection.handle.clone(),
        title: collection.title.clone(),
        seo: Seo {
            title: collection
                .seo_title
                .clone()
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| collection.title.clone()),
            description: collection
                .seo_description
                .clone()
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| description.clone()),
        },
        description,
        parent_category_tree: Vec::new(),
        updated_at: collection.updated_at,
        path: format!("/shop/{}", collection.handle),
    }
}

/// Wine facets recovered from product tags for product cards
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WineFacets {
    pub wine_type: Option<String>,
    pub vintage: Option<String>,
    pub region: Option<String>,
}

fn is_vintage_tag(tag: &str) -> bool {
    tag.len() == 4 && tag.chars().all(|c| c.is_ascii_digit())
}

/// Split product tags back into wine type, vintage and region.
/// Region is the first tag that is neither a wine type nor a vintage.
pub fn wine_tag_facets(tags: &[String]) -> WineFacets {
    let is_type = |t: &str| WINE_TYPES.contains(&t);
    WineFacets {
        wine_type: tags.iter().find(|t| is_type(t)).cloned(),
        vintage: tags.iter().find(|t| is_vintage_tag(t)).cloned(),
        region: tags
            .iter()
            .find(|t| !is_type(t) && !is_vintage_tag(t))
            .cloned(),
    }
}
