use crate::models::{Property, PropertyStatus, PropertyType};
use tracing::info;

/// Built-in sample listings shown when the backend has nothing usable
pub fn fallback_listings() -> Vec<Property> {
    info!("📋 Using built-in sample listings");

    vec![
        Property {
            id: "1".to_string(),
            title: "Apartamento de Luxo".to_string(),
            description: "Luxuoso apartamento com acabamento premium, localizado em uma das regiões mais valorizadas de São Paulo. Possui ampla área social, varanda gourmet e vista panorâmica da cidade.".to_string(),
            location: "Jardins, São Paulo".to_string(),
            price: 2_500_000,
            status: Some(PropertyStatus::Launch),
            property_type: Some(PropertyType::Apartment),
            bedrooms: Some(4),
            suites: Some(2),
            bathrooms: Some(3),
            parking_spots: Some(3),
            area: Some(180.0),
            amenities: tags(&["Piscina", "Academia", "Varanda Gourmet"]),
            images: vec![],
            created_by: None,
            created_at: None,
        },
        Property {
            id: "2".to_string(),
            title: "Casa em Condomínio".to_string(),
            description: "Magnífica casa em condomínio fechado com total infraestrutura de lazer e segurança. Projeto arquitetônico moderno com ambientes integrados e acabamento de alto padrão.".to_string(),
            location: "Alphaville, Barueri".to_string(),
            price: 3_800_000,
            status: Some(PropertyStatus::New),
            property_type: Some(PropertyType::House),
            bedrooms: Some(5),
            suites: Some(3),
            bathrooms: Some(4),
            parking_spots: Some(4),
            area: Some(350.0),
            amenities: tags(&["Área Verde", "Segurança 24h", "Lazer Completo"]),
            images: vec![],
            created_by: None,
            created_at: None,
        },
        Property {
            id: "3".to_string(),
            title: "Cobertura Duplex".to_string(),
            description: "Espetacular cobertura duplex com terraço e vista privilegiada. Ambientes amplos e bem iluminados, perfect para quem busca exclusividade e sofisticação.".to_string(),
            location: "Vila Nova Conceição, São Paulo".to_string(),
            price: 4_500_000,
            status: Some(PropertyStatus::Used),
            property_type: Some(PropertyType::Apartment),
            bedrooms: Some(3),
            suites: Some(3),
            bathrooms: Some(4),
            parking_spots: Some(3),
            area: Some(240.0),
            amenities: tags(&["Vista Panorâmica", "Terraço", "Churrasqueira"]),
            images: vec![],
            created_by: None,
            created_at: None,
        },
    ]
}

fn tags(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
