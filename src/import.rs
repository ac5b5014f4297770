// 📂 Fixture import - CSV → catalog records
//
// Headers are entity field names; an `id` column is optional. Rows go through
// the regular create path, so validation and reference checks apply. Import
// stops at the first bad row; rows before it stay imported.

use std::io::Read;
use std::path::Path;
use tracing::info;

use crate::admin::with_entity_type;
use crate::entities::Entity;
use crate::error::{CatalogError, Result};
use crate::schema::EntityKind;
use crate::store::CatalogStore;

pub fn import_csv(store: &mut CatalogStore, kind: EntityKind, csv_path: &Path) -> Result<usize> {
    let file = std::fs::File::open(csv_path)?;
    let imported = import_csv_reader(store, kind, file)?;
    info!(entity = %kind, path = %csv_path.display(), imported, "fixtures imported");
    Ok(imported)
}

pub fn import_csv_reader<R: Read>(store: &mut CatalogStore, kind: EntityKind, reader: R) -> Result<usize> {
    with_entity_type!(kind, T => import_records::<T, R>(store, reader))
}

fn import_records<T: Entity, R: Read>(store: &mut CatalogStore, reader: R) -> Result<usize> {
    let mut rdr = csv::Reader::from_reader(reader);
    let headers = rdr.headers()?.clone();

    let mut imported = 0;
    for result in rdr.records() {
        let row = result?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        let record: T = row
            .deserialize(Some(&headers))
            .map_err(|e| CatalogError::validation(T::KIND, format!("line {}", line), e.to_string()))?;

        store.create(record).map_err(|e| match e {
            CatalogError::Validation {
                entity,
                field,
                message,
            } => CatalogError::Validation {
                entity,
                field: format!("line {}: {}", line, field),
                message,
            },
            other => other,
        })?;
        imported += 1;
    }

    Ok(imported)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{Address, GoodCategory, GoodType, SubjectArea};
    use std::io::Write;

    #[test]
    fn test_import_with_ids_links_fixtures() {
        let mut store = CatalogStore::open_in_memory().unwrap();

        let areas = "id,name\nfood,Food\nhome,Household\n";
        let categories = "id,subject_area,name\ndairy,food,Dairy\nmisc,,Misc\n";
        let types = "category,name\ndairy,Milk\ndairy,Kefir\n";

        assert_eq!(import_csv_reader(&mut store, EntityKind::SubjectArea, areas.as_bytes()).unwrap(), 2);
        assert_eq!(
            import_csv_reader(&mut store, EntityKind::GoodCategory, categories.as_bytes()).unwrap(),
            2
        );
        assert_eq!(import_csv_reader(&mut store, EntityKind::GoodType, types.as_bytes()).unwrap(), 2);

        let misc: GoodCategory = store.get("misc").unwrap();
        assert_eq!(misc.subject_area, None);
        assert_eq!(store.get::<SubjectArea>("food").unwrap().name, "Food");
        assert_eq!(store.all::<GoodType>().unwrap().len(), 2);
    }

    #[test]
    fn test_import_stops_at_bad_reference() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let types = "category,name\nmissing,Milk\n";

        let err = import_csv_reader(&mut store, EntityKind::GoodType, types.as_bytes()).unwrap_err();
        match err {
            CatalogError::Validation { field, .. } => assert_eq!(field, "line 2: category"),
            other => panic!("expected validation error, got {:?}", other),
        }
        assert_eq!(store.count(EntityKind::GoodType).unwrap(), 0);
    }

    #[test]
    fn test_import_from_file_with_optional_numbers() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "country,region,city,street,building,housing,entrance,floor,room").unwrap();
        writeln!(file, "Belarus,Minsk,Minsk,Lenina,5,,2,,").unwrap();
        writeln!(file, "Belarus,Brest,Pinsk,Sovetskaya,10,1,,3,12").unwrap();

        let mut store = CatalogStore::open_in_memory().unwrap();
        let imported = import_csv(&mut store, EntityKind::Address, file.path()).unwrap();
        assert_eq!(imported, 2);

        let addresses = store.all::<Address>().unwrap();
        assert_eq!(addresses[0].housing, None);
        assert_eq!(addresses[0].entrance, Some(2));
        assert_eq!(
            addresses[1].render(&store).unwrap(),
            "Belarus, Brest region, Pinsk, Sovetskaya, 10, housing 1, floor 3, room 12"
        );
    }

    #[test]
    fn test_import_empty_count_is_zero() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let fixtures = [
            (EntityKind::GoodCategory, "id,name\ndairy,Dairy\n"),
            (EntityKind::GoodType, "id,category,name\nmilk,dairy,Milk\n"),
            (EntityKind::Unit, "id,full_name,short_name\nl,liter,l\n"),
            (EntityKind::Good, "id,good_type,unit,name,code\nm1,milk,l,Milk,4810001\n"),
            (EntityKind::PlaceType, "id,name\nshop,Shop\n"),
            (EntityKind::Contact, "id,first_name,last_name\nivan,Ivan,Petrov\n"),
            (
                EntityKind::Address,
                "id,country,region,city,street,building\nhome,Belarus,Minsk,Minsk,Lenina,5\n",
            ),
            (
                EntityKind::GoodPlace,
                "id,name,place_type,address,contact\nshop1,Shop #1,shop,home,ivan\n",
            ),
        ];
        for (kind, csv) in fixtures {
            import_csv_reader(&mut store, kind, csv.as_bytes()).unwrap();
        }

        let counts = "good_place,good,count\nshop1,m1,\nshop1,m1,4.5\n";
        assert_eq!(import_csv_reader(&mut store, EntityKind::GoodCount, counts.as_bytes()).unwrap(), 2);

        let stored: Vec<f64> = store
            .all::<crate::entities::GoodCount>()
            .unwrap()
            .iter()
            .map(|c| c.count)
            .collect();
        assert_eq!(stored, vec![0.0, 4.5]);
    }

    #[test]
    fn test_import_malformed_number() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let csv = "country,region,city,street,building\nBelarus,Minsk,Minsk,Lenina,five\n";

        let err = import_csv_reader(&mut store, EntityKind::Address, csv.as_bytes()).unwrap_err();
        assert!(matches!(err, CatalogError::Validation { field, .. } if field == "line 2"));
    }
}
